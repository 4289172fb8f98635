use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, byteorder::little_endian::U32};

use crate::{config::AudioFormat, error::ContainerError, framebuffer::BUFFER_SIZE};

pub const HEADER_SIZE: usize = core::mem::size_of::<RawHeader>();
pub const FRAME_SIZE: u64 = BUFFER_SIZE as u64;

/// On-disk layout: five little-endian u32 fields.
#[repr(C)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout)]
struct RawHeader {
    frame_count: U32,
    audio_byte_size: U32,
    sample_rate_hz: U32,
    channel_count: U32,
    bits_per_sample: U32,
}

/// Geometry of a container's payload.
///
/// Encoding and decoding never check the values; that is left to
/// [`crate::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerHeader {
    pub frame_count: u32,
    pub audio_byte_size: u32,
    pub sample_rate_hz: u32,
    pub channel_count: u32,
    pub bits_per_sample: u32,
}

impl ContainerHeader {
    pub fn new(frame_count: u32, audio_byte_size: u32, format: AudioFormat) -> Self {
        Self {
            frame_count,
            audio_byte_size,
            sample_rate_hz: format.sample_rate_hz,
            channel_count: format.channel_count,
            bits_per_sample: format.bits_per_sample,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let raw = RawHeader {
            frame_count: U32::new(self.frame_count),
            audio_byte_size: U32::new(self.audio_byte_size),
            sample_rate_hz: U32::new(self.sample_rate_hz),
            channel_count: U32::new(self.channel_count),
            bits_per_sample: U32::new(self.bits_per_sample),
        };
        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(raw.as_bytes());
        out
    }

    /// Decodes the first [`HEADER_SIZE`] bytes of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, ContainerError> {
        let (raw, _) = RawHeader::read_from_prefix(bytes)
            .map_err(|_| ContainerError::TruncatedHeader { actual: bytes.len() })?;
        Ok(Self {
            frame_count: raw.frame_count.get(),
            audio_byte_size: raw.audio_byte_size.get(),
            sample_rate_hz: raw.sample_rate_hz.get(),
            channel_count: raw.channel_count.get(),
            bits_per_sample: raw.bits_per_sample.get(),
        })
    }

    pub fn audio_format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate_hz: self.sample_rate_hz,
            channel_count: self.channel_count,
            bits_per_sample: self.bits_per_sample,
        }
    }

    pub fn video_size(&self) -> u64 {
        self.frame_count as u64 * FRAME_SIZE
    }

    pub fn video_offset(&self) -> u64 {
        HEADER_SIZE as u64
    }

    pub fn audio_offset(&self) -> u64 {
        HEADER_SIZE as u64 + self.video_size()
    }

    /// Size in bytes of a file holding exactly this payload.
    pub fn expected_file_size(&self) -> u64 {
        self.audio_offset() + self.audio_byte_size as u64
    }

    /// Whole sample frames in the audio section. Zero for a degenerate format.
    pub fn total_sample_frames(&self) -> u64 {
        match self.audio_format().bytes_per_sample_frame() {
            0 => 0,
            bpsf => self.audio_byte_size as u64 / bpsf,
        }
    }

    pub fn video_duration_secs(&self, fps: u32) -> f64 {
        if fps == 0 {
            return 0.0;
        }
        self.frame_count as f64 / fps as f64
    }

    pub fn audio_duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.total_sample_frames() as f64 / self.sample_rate_hz as f64
    }
}

/// Header of the video-only intermediate: just the frame count.
#[repr(C)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout)]
pub(crate) struct VideoFileHeader {
    pub frame_count: U32,
}

pub const VIDEO_FILE_HEADER_SIZE: usize = core::mem::size_of::<VideoFileHeader>();
