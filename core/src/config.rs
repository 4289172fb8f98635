/// Parameters shared by the packer and the validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecConfig {
    /// Pixels brighter than this are lit.
    pub threshold: u8,
    /// Swap lit and dark after thresholding.
    pub invert: bool,
    /// Playback rate of the video section. Not stored in the container.
    pub fps: u32,
    /// Largest tolerated difference between video and audio duration.
    pub max_sync_drift_secs: f64,
    /// Frame counts above this produce a warning.
    pub frame_count_warn: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            threshold: 128,
            invert: false,
            fps: 30,
            max_sync_drift_secs: 0.5,
            frame_count_warn: 10_000,
        }
    }
}

impl CodecConfig {
    pub fn with_threshold(self, threshold: u8) -> Self {
        Self { threshold, ..self }
    }

    pub fn with_invert(self, invert: bool) -> Self {
        Self { invert, ..self }
    }

    pub fn with_fps(self, fps: u32) -> Self {
        Self { fps, ..self }
    }
}

pub const STANDARD_SAMPLE_RATES: [u32; 7] = [8000, 11025, 16000, 22050, 32000, 44100, 48000];
pub const SUPPORTED_CHANNEL_COUNTS: [u32; 2] = [1, 2];
pub const SUPPORTED_BIT_DEPTHS: [u32; 4] = [8, 16, 24, 32];

/// PCM layout of the audio section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate_hz: u32,
    pub channel_count: u32,
    pub bits_per_sample: u32,
}

impl Default for AudioFormat {
    /// The device DAC runs 32 kHz, stereo, 16 bit.
    fn default() -> Self {
        Self {
            sample_rate_hz: 32_000,
            channel_count: 2,
            bits_per_sample: 16,
        }
    }
}

impl AudioFormat {
    /// Bytes of one sample across all channels. Zero for a degenerate format.
    pub fn bytes_per_sample_frame(&self) -> u64 {
        (self.bits_per_sample as u64 / 8) * self.channel_count as u64
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample as usize / 8
    }

    /// Whether channel count and bit depth are both in the supported sets.
    pub fn is_supported(&self) -> bool {
        SUPPORTED_CHANNEL_COUNTS.contains(&self.channel_count)
            && SUPPORTED_BIT_DEPTHS.contains(&self.bits_per_sample)
    }
}
