//! The single-file media container played back by the device.
//!
//! ```text
//! 0..20          header (see [`ContainerHeader`])
//! 20..           frame_count * 1024 bytes of packed frames, in playback order
//! ...end         audio_byte_size bytes of interleaved little-endian PCM
//! ```
//!
//! Parsing is lenient about trailing bytes. [`crate::validate`] is the strict
//! consistency check.

use alloc::vec::Vec;

use log::{debug, info, warn};

use crate::{
    config::AudioFormat,
    error::ContainerError,
    framebuffer::{BUFFER_SIZE, PackedFrame},
};

mod header;
mod video_file;

pub use header::{ContainerHeader, FRAME_SIZE, HEADER_SIZE, VIDEO_FILE_HEADER_SIZE};
pub use video_file::{VideoFile, assemble_from_parts, encode_video_file};

type Result<T> = core::result::Result<T, ContainerError>;

/// Borrowed view of a parsed container.
#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    header: ContainerHeader,
    video: &'a [u8],
    audio: &'a [u8],
    file_len: u64,
}

impl<'a> Container<'a> {
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    pub fn frame_count(&self) -> u32 {
        self.header.frame_count
    }

    pub fn audio_format(&self) -> AudioFormat {
        self.header.audio_format()
    }

    /// Length of the whole source buffer, trailing bytes included.
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    pub fn video(&self) -> &'a [u8] {
        self.video
    }

    pub fn audio(&self) -> &'a [u8] {
        self.audio
    }

    pub fn frame_bytes(&self, index: usize) -> Option<&'a [u8; BUFFER_SIZE]> {
        let start = index.checked_mul(BUFFER_SIZE)?;
        let end = start.checked_add(BUFFER_SIZE)?;
        self.video.get(start..end)?.try_into().ok()
    }

    pub fn frame(&self, index: usize) -> Option<PackedFrame> {
        self.frame_bytes(index).map(PackedFrame::from_bytes)
    }

    pub fn frames(&self) -> impl Iterator<Item = PackedFrame> + 'a {
        self.video
            .chunks_exact(BUFFER_SIZE)
            .filter_map(|chunk| <&[u8; BUFFER_SIZE]>::try_from(chunk).ok())
            .map(PackedFrame::from_bytes)
    }
}

/// Splits `raw` into header, video and audio sections.
pub fn parse(raw: &[u8]) -> Result<Container<'_>> {
    let header = ContainerHeader::decode(raw)?;
    let expected = header.expected_file_size();
    let actual = raw.len() as u64;
    if actual < expected {
        return Err(ContainerError::TruncatedPayload { expected, actual });
    }
    if actual > expected {
        debug!("Ignoring {} trailing bytes after container payload", actual - expected);
    }

    // Both offsets fit in usize: they are bounded by raw.len().
    let video_start = HEADER_SIZE;
    let audio_start = header.audio_offset() as usize;
    let audio_end = expected as usize;
    Ok(Container {
        header,
        video: &raw[video_start..audio_start],
        audio: &raw[audio_start..audio_end],
        file_len: actual,
    })
}

/// An assembled container held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerFile {
    header: ContainerHeader,
    bytes: Vec<u8>,
}

impl ContainerFile {
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn container(&self) -> Container<'_> {
        let audio_start = self.header.audio_offset() as usize;
        Container {
            header: self.header,
            video: &self.bytes[HEADER_SIZE..audio_start],
            audio: &self.bytes[audio_start..],
            file_len: self.bytes.len() as u64,
        }
    }
}

pub(crate) fn checked_u32(len: u64) -> Result<u32> {
    u32::try_from(len).map_err(|_| ContainerError::PayloadTooLarge { len })
}

/// Builds the header for `frame_count` frames and `audio_len` audio bytes.
pub(crate) fn header_for(
    frame_count: usize,
    audio_len: usize,
    format: AudioFormat,
) -> Result<ContainerHeader> {
    if frame_count == 0 {
        return Err(ContainerError::EmptyVideo);
    }
    let frame_count = checked_u32(frame_count as u64)?;
    let audio_byte_size = checked_u32(audio_len as u64)?;
    let bpsf = format.bytes_per_sample_frame();
    if bpsf != 0 && audio_byte_size as u64 % bpsf != 0 {
        warn!(
            "Audio size {} is not a multiple of {} bytes per sample frame",
            audio_byte_size, bpsf
        );
    }
    Ok(ContainerHeader::new(frame_count, audio_byte_size, format))
}

/// Concatenates header, packed frames and audio into a container.
pub fn assemble(
    frames: &[PackedFrame],
    audio: &[u8],
    format: AudioFormat,
) -> Result<ContainerFile> {
    let header = header_for(frames.len(), audio.len(), format)?;
    let mut bytes = Vec::with_capacity(header.expected_file_size() as usize);
    bytes.extend_from_slice(&header.encode());
    for frame in frames {
        bytes.extend_from_slice(frame.as_bytes());
    }
    bytes.extend_from_slice(audio);
    info!(
        "Assembled container: {} frames, {} audio bytes, {} bytes total",
        header.frame_count,
        header.audio_byte_size,
        bytes.len()
    );
    Ok(ContainerFile { header, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn numbered_frames(count: usize) -> Vec<PackedFrame> {
        (0..count)
            .map(|i| PackedFrame::from([i as u8; BUFFER_SIZE]))
            .collect()
    }

    #[test]
    fn test_assemble_layout() {
        let frames = numbered_frames(3);
        let audio = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let file = assemble(&frames, &audio, AudioFormat::default()).unwrap();
        let bytes = file.as_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE + 3 * BUFFER_SIZE + audio.len());
        assert_eq!(&bytes[..4], &3u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &8u32.to_le_bytes());
        assert_eq!(bytes[HEADER_SIZE], 0);
        assert_eq!(bytes[HEADER_SIZE + BUFFER_SIZE], 1);
        assert_eq!(bytes[HEADER_SIZE + 2 * BUFFER_SIZE + BUFFER_SIZE - 1], 2);
        assert_eq!(&bytes[HEADER_SIZE + 3 * BUFFER_SIZE..], &audio);
    }

    #[test]
    fn test_assemble_empty_video() {
        assert_eq!(
            assemble(&[], &[0; 4], AudioFormat::default()),
            Err(ContainerError::EmptyVideo)
        );
    }

    #[test]
    fn test_assemble_then_parse() {
        let frames = numbered_frames(5);
        let audio = vec![0x7Fu8; 400];
        let file = assemble(&frames, &audio, AudioFormat::default()).unwrap();
        let container = parse(file.as_bytes()).unwrap();
        assert_eq!(container.header(), file.header());
        assert_eq!(container.frame_count(), 5);
        assert_eq!(container.video().len(), 5 * BUFFER_SIZE);
        assert_eq!(container.audio(), &audio[..]);
        assert_eq!(container.frame(4), Some(frames[4].clone()));
        assert_eq!(container.frame(5), None);
        assert_eq!(container.frames().collect::<Vec<_>>(), frames);

        let view = file.container();
        assert_eq!(view.video(), container.video());
        assert_eq!(view.audio(), container.audio());
    }

    #[test]
    fn test_parse_truncated_header() {
        assert_eq!(
            parse(&[0u8; 12]).unwrap_err(),
            ContainerError::TruncatedHeader { actual: 12 }
        );
    }

    #[test]
    fn test_parse_truncated_payload() {
        let file = assemble(&numbered_frames(2), &[0u8; 64], AudioFormat::default()).unwrap();
        let bytes = file.as_bytes();
        let short = &bytes[..bytes.len() - 1];
        assert_eq!(
            parse(short).unwrap_err(),
            ContainerError::TruncatedPayload {
                expected: bytes.len() as u64,
                actual: bytes.len() as u64 - 1,
            }
        );
    }

    #[test]
    fn test_parse_ignores_trailing_bytes() {
        let file = assemble(&numbered_frames(1), &[9u8; 16], AudioFormat::default()).unwrap();
        let mut padded = file.into_bytes();
        padded.extend_from_slice(&[0xEE; 512]);
        let container = parse(&padded).unwrap();
        assert_eq!(container.audio(), &[9u8; 16]);
        assert_eq!(container.file_len(), padded.len() as u64);
    }

    #[test]
    fn test_parse_huge_frame_count_is_truncation() {
        let header = ContainerHeader::new(u32::MAX, u32::MAX, AudioFormat::default());
        assert!(matches!(
            parse(&header.encode()),
            Err(ContainerError::TruncatedPayload { .. })
        ));
    }
}
