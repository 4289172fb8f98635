//! Evenly spaced samples of a container's video and audio for reporting.

use alloc::vec::Vec;

use heapless::Vec as ChannelVec;

use crate::{container::Container, framebuffer::PIXEL_COUNT, packer::unpack};

/// Most channels a sample frame can hold.
pub const MAX_CHANNELS: usize = 2;

/// `floor(i * count / n)` for `i` in `0..n`. Repeats indices when `n > count`.
pub fn even_indices(count: u64, n: usize) -> impl Iterator<Item = u64> {
    (0..n as u64).map(move |i| (i as u128 * count as u128 / n as u128) as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    AllBlack,
    AllWhite,
    VeryDark,
    VeryBright,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub index: usize,
    pub white_pixels: u32,
    pub black_pixels: u32,
    pub all_black: bool,
    pub all_white: bool,
}

impl FrameStats {
    pub fn white_ratio(&self) -> f64 {
        self.white_pixels as f64 / PIXEL_COUNT as f64
    }

    pub fn tone(&self) -> Tone {
        let ratio = self.white_ratio();
        if self.all_black {
            Tone::AllBlack
        } else if self.all_white {
            Tone::AllWhite
        } else if ratio < 0.05 {
            Tone::VeryDark
        } else if ratio > 0.95 {
            Tone::VeryBright
        } else {
            Tone::Balanced
        }
    }
}

pub fn sample_frames(container: &Container<'_>, n: usize) -> Vec<FrameStats> {
    let mut stats = Vec::with_capacity(n);
    for index in even_indices(container.frame_count() as u64, n) {
        let index = index as usize;
        let Some(frame) = container.frame(index) else {
            continue;
        };
        let raster = unpack(&frame);
        let white_pixels = raster.pixels().iter().filter(|&&p| p != 0).count() as u32;
        let black_pixels = PIXEL_COUNT as u32 - white_pixels;
        stats.push(FrameStats {
            index,
            white_pixels,
            black_pixels,
            all_black: white_pixels == 0,
            all_white: black_pixels == 0,
        });
    }
    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Silent,
    Quiet,
    NearClipping,
    Normal,
}

const QUIET_LEVEL: f64 = 100.0 / 32768.0;
const CLIPPING_LEVEL: f64 = 30000.0 / 32768.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSampleStats {
    pub index: u64,
    pub bits_per_sample: u32,
    /// One signed value per channel, in interleave order.
    pub values: ChannelVec<i32, MAX_CHANNELS>,
}

impl AudioSampleStats {
    /// `value / 2^(bits-1)`, so full scale is roughly -1.0..1.0. `None` for a
    /// depth outside 1..=32.
    pub fn normalized(&self, channel: usize) -> Option<f64> {
        let value = *self.values.get(channel)?;
        if !(1..=32).contains(&self.bits_per_sample) {
            return None;
        }
        let full_scale = (1u64 << (self.bits_per_sample - 1)) as f64;
        Some(value as f64 / full_scale)
    }

    pub fn level(&self) -> Level {
        let levels = (0..self.values.len()).filter_map(|c| self.normalized(c));
        if self.values.iter().all(|&v| v == 0) {
            Level::Silent
        } else if levels.clone().any(|l| l.abs() > CLIPPING_LEVEL) {
            Level::NearClipping
        } else if levels.clone().all(|l| l.abs() < QUIET_LEVEL) {
            Level::Quiet
        } else {
            Level::Normal
        }
    }
}

/// Sign-extends a little-endian sample of 1 to 4 bytes.
fn decode_sample(bytes: &[u8]) -> i32 {
    // Most significant byte first, then an arithmetic shift drops the padding.
    let mut be = [0u8; 4];
    for (dst, src) in be.iter_mut().zip(bytes.iter().rev()) {
        *dst = *src;
    }
    i32::from_be_bytes(be) >> (8 * (4 - bytes.len()))
}

pub fn sample_audio(container: &Container<'_>, n: usize) -> Vec<AudioSampleStats> {
    let format = container.audio_format();
    if !format.is_supported() {
        return Vec::new();
    }
    let width = format.bytes_per_sample();
    let bpsf = format.bytes_per_sample_frame() as usize;
    let total = container.header().total_sample_frames();
    let audio = container.audio();

    let mut stats = Vec::with_capacity(n);
    for index in even_indices(total, n) {
        let start = index as usize * bpsf;
        let Some(frame) = audio.get(start..start + bpsf) else {
            continue;
        };
        let mut values = ChannelVec::new();
        for sample in frame.chunks_exact(width) {
            // Bounded by the supported channel counts.
            let _ = values.push(decode_sample(sample));
        }
        stats.push(AudioSampleStats {
            index,
            bits_per_sample: format.bits_per_sample,
            values,
        });
    }
    stats
}

/// Quality grade of the video/audio duration difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncGrade {
    Excellent,
    Good,
    Drifting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub video_secs: f64,
    pub audio_secs: f64,
    /// Audio sample frames played per video frame.
    pub samples_per_video_frame: u32,
}

impl Timing {
    pub fn of(container: &Container<'_>, fps: u32) -> Self {
        let header = container.header();
        Self {
            video_secs: header.video_duration_secs(fps),
            audio_secs: header.audio_duration_secs(),
            samples_per_video_frame: if fps == 0 { 0 } else { header.sample_rate_hz / fps },
        }
    }

    pub fn drift_secs(&self) -> f64 {
        (self.video_secs - self.audio_secs).abs()
    }

    pub fn grade(&self) -> SyncGrade {
        let drift = self.drift_secs();
        if drift < 0.1 {
            SyncGrade::Excellent
        } else if drift < 0.5 {
            SyncGrade::Good
        } else {
            SyncGrade::Drifting
        }
    }
}
