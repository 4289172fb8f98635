use argh::FromArgs;
use embedded_io::Write;
use log::{error, info, warn};
use pagevid_core::{
    config::{AudioFormat, CodecConfig},
    container::{ContainerFile, assemble_from_parts},
    inspect::{SyncGrade, Timing},
    validate::{ValidationReport, validate_container},
};

use crate::std_fs::{Mode, StdFile, read_all};

mod std_fs;

#[derive(FromArgs)]
/// Combine the packed video file and raw PCM into the playback container
struct Args {
    /// packed video file from img2frames
    #[argh(option, short = 'v')]
    video: String,

    /// headerless interleaved PCM
    #[argh(option, short = 'a')]
    audio: String,

    /// output container path
    #[argh(option, short = 'o')]
    output_path: String,

    /// audio sample rate in Hz
    #[argh(option, default = "32000")]
    sample_rate: u32,

    /// audio channel count
    #[argh(option, default = "2")]
    channels: u32,

    /// bits per audio sample
    #[argh(option, default = "16")]
    bits: u32,

    /// video playback rate used for the sync check
    #[argh(option, default = "30")]
    fps: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let format = AudioFormat {
        sample_rate_hz: args.sample_rate,
        channel_count: args.channels,
        bits_per_sample: args.bits,
    };
    let config = CodecConfig::default().with_fps(args.fps);

    let video = read_all(&args.video).unwrap_or_else(|e| {
        error!("Failed to read video file {}: {}", args.video, e);
        std::process::exit(1);
    });
    let pcm = read_all(&args.audio).unwrap_or_else(|e| {
        error!("Failed to read audio file {}: {}", args.audio, e);
        std::process::exit(1);
    });
    if pcm.is_empty() {
        warn!("Audio file {} is empty", args.audio);
    } else if pcm.iter().take(1024).all(|&b| b == 0) {
        warn!("First 1KB of audio is silent");
    }

    let file = assemble_from_parts(&video, &pcm, format).unwrap_or_else(|e| {
        error!("Invalid input: {}", e);
        std::process::exit(1);
    });

    let container = file.container();
    let timing = Timing::of(&container, config.fps);
    info!(
        "Video {:.2}s, audio {:.2}s, difference {:.2}s",
        timing.video_secs,
        timing.audio_secs,
        timing.drift_secs()
    );
    match timing.grade() {
        SyncGrade::Excellent => info!("Good sync"),
        SyncGrade::Good => warn!("Minor duration difference, may be acceptable"),
        SyncGrade::Drifting => warn!("Duration difference may cause sync issues"),
    }

    if check_before_write(&file, &config).is_err() {
        error!("Not writing {}: container failed validation", args.output_path);
        std::process::exit(1);
    }

    let mut out = StdFile::open(&args.output_path, Mode::Write).unwrap_or_else(|e| {
        error!("Failed to create {}: {}", args.output_path, e);
        std::process::exit(1);
    });
    if let Err(e) = out.write_all(file.as_bytes()).and_then(|_| out.flush()) {
        error!("Failed to write {}: {}", args.output_path, e);
        std::process::exit(1);
    }
    info!(
        "Wrote {} ({} frames, {} audio bytes, {} bytes total)",
        args.output_path,
        file.header().frame_count,
        file.header().audio_byte_size,
        file.as_bytes().len()
    );
}

/// Logs every finding and fails when the container must not be written.
fn check_before_write(
    file: &ContainerFile,
    config: &CodecConfig,
) -> Result<ValidationReport, ValidationReport> {
    let report = validate_container(&file.container(), config);
    for finding in report.warnings() {
        warn!("{}", finding);
    }
    for finding in report.errors() {
        error!("{}", finding);
    }
    if report.is_valid() {
        Ok(report)
    } else {
        Err(report)
    }
}
