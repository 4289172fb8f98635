use argh::FromArgs;
use log::error;
use pagevid_core::{
    config::CodecConfig,
    container::{self, ContainerHeader, FRAME_SIZE},
    inspect::{Level, SyncGrade, Timing, Tone, sample_audio, sample_frames},
    validate::{ValidationReport, validate_bytes},
};

use crate::std_fs::read_all;

mod std_fs;

#[derive(FromArgs)]
/// Inspect and validate a playback container
struct Args {
    /// container file
    #[argh(positional)]
    path: String,

    /// number of frames and audio positions to sample
    #[argh(option, short = 'n', default = "5")]
    samples: usize,

    /// video playback rate
    #[argh(option, default = "30")]
    fps: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let config = CodecConfig::default().with_fps(args.fps);

    let raw = read_all(&args.path).unwrap_or_else(|e| {
        error!("Failed to read {}: {}", args.path, e);
        std::process::exit(1);
    });

    let report = validate_bytes(&raw, &config);
    let Ok(header) = ContainerHeader::decode(&raw) else {
        print_findings(&report);
        std::process::exit(1);
    };

    print_header(&header, raw.len());
    print_findings(&report);

    // Sampling needs the declared sections to be present.
    match container::parse(&raw) {
        Ok(container) => {
            let timing = Timing::of(&container, config.fps);
            print_timing(&header, &timing, config.fps);
            print_frames(&container, args.samples);
            print_audio(&container, args.samples);
        }
        Err(e) => println!("Skipping sampling: {}\n", e),
    }

    println!("{}", "=".repeat(70));
    if report.is_valid() && report.warnings().is_empty() {
        println!("No issues found");
    } else if report.is_valid() {
        println!("Warnings present");
    } else {
        println!("Errors found");
        std::process::exit(1);
    }
}

fn print_header(header: &ContainerHeader, file_len: usize) {
    println!("HEADER");
    println!("{}", "-".repeat(70));
    println!("Frame count:      {}", header.frame_count);
    println!("Audio size:       {} bytes", header.audio_byte_size);
    println!("Sample rate:      {} Hz", header.sample_rate_hz);
    println!(
        "Channels:         {} ({})",
        header.channel_count,
        if header.channel_count == 1 { "mono" } else { "stereo" }
    );
    println!("Bits per sample:  {}", header.bits_per_sample);
    println!("File size:        {} bytes", file_len);
    println!();
}

fn print_findings(report: &ValidationReport) {
    println!("VALIDATION");
    println!("{}", "-".repeat(70));
    if report.errors().is_empty() {
        println!("No errors found");
    } else {
        println!("Errors:");
        for finding in report.errors() {
            println!("  - {}", finding);
        }
    }
    if report.warnings().is_empty() {
        println!("No warnings");
    } else {
        println!("Warnings:");
        for finding in report.warnings() {
            println!("  - {}", finding);
        }
    }
    println!();
}

fn minutes(secs: f64) -> String {
    format!("{}:{:02}", (secs / 60.0) as u64, (secs % 60.0) as u64)
}

fn print_timing(header: &ContainerHeader, timing: &Timing, fps: u32) {
    let bpsf = header.audio_format().bytes_per_sample_frame();
    println!("CALCULATED VALUES");
    println!("{}", "-".repeat(70));
    println!("Video section:");
    println!("  Size:        {} bytes", header.frame_count as u64 * FRAME_SIZE);
    println!("  Duration:    {}", minutes(timing.video_secs));
    println!("  Frame rate:  {} FPS", fps);
    println!("Audio section:");
    println!("  Total samples:      {}", header.total_sample_frames());
    println!("  Duration:           {}", minutes(timing.audio_secs));
    println!(
        "  Data rate:          {:.1} KB/s",
        header.sample_rate_hz as f64 * bpsf as f64 / 1024.0
    );
    println!("  Samples per frame:  {}", timing.samples_per_video_frame);
    println!("Synchronization:");
    println!("  Duration diff:   {:.3} seconds", timing.drift_secs());
    let status = match timing.grade() {
        SyncGrade::Excellent => "Excellent",
        SyncGrade::Good => "Good",
        SyncGrade::Drifting => "May have sync issues",
    };
    println!("  Status:          {}", status);
    println!();
}

fn print_frames(container: &container::Container<'_>, samples: usize) {
    println!("VIDEO FRAME SAMPLING");
    println!("{}", "-".repeat(70));
    let stats = sample_frames(container, samples);
    if stats.is_empty() {
        println!("Could not sample frames\n");
        return;
    }
    println!("{:<10} {:<12} {:<12} {:<10} Status", "Frame", "White", "Black", "White %");
    for sample in stats {
        let status = match sample.tone() {
            Tone::AllBlack => "All black",
            Tone::AllWhite => "All white",
            Tone::VeryDark | Tone::VeryBright => "Very dark/bright",
            Tone::Balanced => "Good",
        };
        println!(
            "{:<10} {:<12} {:<12} {:<10.1} {}",
            sample.index,
            sample.white_pixels,
            sample.black_pixels,
            sample.white_ratio() * 100.0,
            status
        );
    }
    println!();
}

fn print_audio(container: &container::Container<'_>, samples: usize) {
    println!("AUDIO SAMPLE ANALYSIS");
    println!("{}", "-".repeat(70));
    let stats = sample_audio(container, samples);
    if stats.is_empty() {
        println!("Could not sample audio\n");
        return;
    }
    for sample in stats {
        let levels: Vec<String> = (0..sample.values.len())
            .map(|c| {
                format!(
                    "{:>8} ({:>6.1}%)",
                    sample.values[c],
                    sample.normalized(c).unwrap_or(0.0) * 100.0
                )
            })
            .collect();
        let status = match sample.level() {
            Level::Silent => "Silent",
            Level::Quiet => "Very quiet",
            Level::NearClipping => "Near clipping",
            Level::Normal => "Good",
        };
        println!("{:<12} {}  {}", sample.index, levels.join("  "), status);
    }
    println!();
}
