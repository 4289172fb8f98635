//! Structural and semantic checks on a container.
//!
//! Every check runs; problems accumulate as [`Finding`]s instead of aborting.
//! Errors make the file unplayable, warnings are left to human judgement.

use alloc::vec::Vec;
use core::fmt;

use log::{debug, warn};

use crate::{
    config::{CodecConfig, STANDARD_SAMPLE_RATES, SUPPORTED_BIT_DEPTHS, SUPPORTED_CHANNEL_COUNTS},
    container::{Container, ContainerHeader, FRAME_SIZE, HEADER_SIZE},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Finding {
    UnreadableHeader { actual: u64 },
    FrameCountZero,
    FrameCountHigh { frame_count: u32 },
    SampleRateZero,
    NonStandardSampleRate { sample_rate_hz: u32 },
    InvalidChannelCount { channel_count: u32 },
    InvalidBitDepth { bits_per_sample: u32 },
    MisalignedAudio { audio_byte_size: u32, bytes_per_sample_frame: u64 },
    FileSizeMismatch { expected: u64, actual: u64 },
    DurationMismatch { video_secs: f64, audio_secs: f64 },
    VideoOverrun { end: u64, file_len: u64 },
    AudioOverrun { end: u64, file_len: u64 },
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Finding::FrameCountHigh { .. }
            | Finding::NonStandardSampleRate { .. }
            | Finding::DurationMismatch { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Finding::UnreadableHeader { actual } => write!(
                f,
                "Could not read header ({} bytes, need at least {})",
                actual, HEADER_SIZE
            ),
            Finding::FrameCountZero => f.write_str("Frame count is zero"),
            Finding::FrameCountHigh { frame_count } => {
                write!(f, "Frame count very high ({})", frame_count)
            }
            Finding::SampleRateZero => f.write_str("Sample rate is zero"),
            Finding::NonStandardSampleRate { sample_rate_hz } => {
                write!(f, "Non-standard sample rate ({} Hz)", sample_rate_hz)
            }
            Finding::InvalidChannelCount { channel_count } => {
                write!(f, "Invalid channel count ({})", channel_count)
            }
            Finding::InvalidBitDepth { bits_per_sample } => {
                write!(f, "Invalid bit depth ({})", bits_per_sample)
            }
            Finding::MisalignedAudio { audio_byte_size, bytes_per_sample_frame } => write!(
                f,
                "Audio size not aligned to sample boundary ({} % {} != 0)",
                audio_byte_size, bytes_per_sample_frame
            ),
            Finding::FileSizeMismatch { expected, actual } => {
                write!(f, "File size mismatch: expected {}, got {}", expected, actual)
            }
            Finding::DurationMismatch { video_secs, audio_secs } => write!(
                f,
                "Video/audio duration differs by {:.2}s (video {:.2}s, audio {:.2}s)",
                (video_secs - audio_secs).abs(),
                video_secs,
                audio_secs
            ),
            Finding::VideoOverrun { end, file_len } => write!(
                f,
                "Video data extends beyond file (ends at {}, file is {} bytes)",
                end, file_len
            ),
            Finding::AudioOverrun { end, file_len } => write!(
                f,
                "Audio data extends beyond file (ends at {}, file is {} bytes)",
                end, file_len
            ),
        }
    }
}

/// Outcome of [`validate`]. Findings keep the order the checks ran in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    warnings: Vec<Finding>,
    errors: Vec<Finding>,
}

impl ValidationReport {
    fn push(&mut self, finding: Finding) {
        match finding.severity() {
            Severity::Warning => {
                debug!("warning: {}", finding);
                self.warnings.push(finding)
            }
            Severity::Error => {
                warn!("error: {}", finding);
                self.errors.push(finding)
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn has(&self, predicate: impl Fn(&Finding) -> bool) -> bool {
        self.warnings.iter().chain(&self.errors).any(predicate)
    }
}

/// Checks a header against the actual length of the file it came from.
pub fn validate(header: &ContainerHeader, file_len: u64, config: &CodecConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if header.frame_count == 0 {
        report.push(Finding::FrameCountZero);
    } else if header.frame_count > config.frame_count_warn {
        report.push(Finding::FrameCountHigh {
            frame_count: header.frame_count,
        });
    }

    if header.sample_rate_hz == 0 {
        report.push(Finding::SampleRateZero);
    } else if !STANDARD_SAMPLE_RATES.contains(&header.sample_rate_hz) {
        report.push(Finding::NonStandardSampleRate {
            sample_rate_hz: header.sample_rate_hz,
        });
    }

    let channels_ok = SUPPORTED_CHANNEL_COUNTS.contains(&header.channel_count);
    if !channels_ok {
        report.push(Finding::InvalidChannelCount {
            channel_count: header.channel_count,
        });
    }
    let bits_ok = SUPPORTED_BIT_DEPTHS.contains(&header.bits_per_sample);
    if !bits_ok {
        report.push(Finding::InvalidBitDepth {
            bits_per_sample: header.bits_per_sample,
        });
    }

    // The divisor is only meaningful for a supported format.
    if channels_ok && bits_ok {
        let bpsf = header.audio_format().bytes_per_sample_frame();
        if header.audio_byte_size as u64 % bpsf != 0 {
            report.push(Finding::MisalignedAudio {
                audio_byte_size: header.audio_byte_size,
                bytes_per_sample_frame: bpsf,
            });
        }
    }

    let expected = header.expected_file_size();
    if file_len != expected {
        report.push(Finding::FileSizeMismatch {
            expected,
            actual: file_len,
        });
    }

    let video_secs = header.video_duration_secs(config.fps);
    let audio_secs = header.audio_duration_secs();
    if (video_secs - audio_secs).abs() > config.max_sync_drift_secs {
        report.push(Finding::DurationMismatch {
            video_secs,
            audio_secs,
        });
    }

    let video_end = HEADER_SIZE as u64 + header.frame_count as u64 * FRAME_SIZE;
    if video_end > file_len {
        report.push(Finding::VideoOverrun {
            end: video_end,
            file_len,
        });
    }
    if expected > file_len {
        report.push(Finding::AudioOverrun {
            end: expected,
            file_len,
        });
    }

    report
}

pub fn validate_container(container: &Container<'_>, config: &CodecConfig) -> ValidationReport {
    validate(container.header(), container.file_len(), config)
}

/// Validates a raw file. Unlike [`crate::container::parse`] this accepts
/// truncated payloads and reports them as findings.
pub fn validate_bytes(raw: &[u8], config: &CodecConfig) -> ValidationReport {
    match ContainerHeader::decode(raw) {
        Ok(header) => validate(&header, raw.len() as u64, config),
        Err(_) => {
            let mut report = ValidationReport::default();
            report.push(Finding::UnreadableHeader {
                actual: raw.len() as u64,
            });
            report
        }
    }
}
