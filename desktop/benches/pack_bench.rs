use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use pagevid_core::{
    config::{AudioFormat, CodecConfig},
    container,
    framebuffer::{HEIGHT, RasterFrame, WIDTH},
    inspect, packer, validate,
};

fn gradient() -> RasterFrame {
    let pixels = (0..HEIGHT)
        .flat_map(|row| (0..WIDTH).map(move |column| ((row * 4 + column * 2) % 256) as u8))
        .collect();
    RasterFrame::new(WIDTH, HEIGHT, pixels).unwrap()
}

fn pack_benchmark(c: &mut Criterion) {
    let config = CodecConfig::default();
    let raster = gradient();
    c.bench_function("pack_frame", |b| {
        b.iter(|| packer::pack(black_box(&raster), &config).unwrap())
    });

    let packed = packer::pack(&raster, &config).unwrap();
    c.bench_function("unpack_frame", |b| b.iter(|| packer::unpack(black_box(&packed))));
}

fn container_benchmark(c: &mut Criterion) {
    let config = CodecConfig::default();
    let format = AudioFormat::default();
    let frame = packer::pack(&gradient(), &config).unwrap();
    let frames = vec![frame; 300];
    let audio = vec![0x40u8; 300 * 4 * 32000 / 30];
    let file = container::assemble(&frames, &audio, format).unwrap();

    c.bench_function("assemble_10s", |b| {
        b.iter(|| container::assemble(black_box(&frames), black_box(&audio), format).unwrap())
    });
    c.bench_function("validate_10s", |b| {
        b.iter(|| validate::validate_bytes(black_box(file.as_bytes()), &config))
    });
    c.bench_function("sample_10s", |b| {
        b.iter(|| {
            let parsed = container::parse(black_box(file.as_bytes())).unwrap();
            (inspect::sample_frames(&parsed, 5), inspect::sample_audio(&parsed, 5))
        })
    });
}

criterion_group!(benches, pack_benchmark, container_benchmark);
criterion_main!(benches);
