//! Video-only intermediate written by the frame converter: a little-endian
//! u32 frame count followed by the packed frames. No audio, no other fields.

use alloc::vec::Vec;

use log::info;
use zerocopy::{FromBytes, IntoBytes, byteorder::little_endian::U32};

use super::{
    ContainerFile, FRAME_SIZE, HEADER_SIZE, VIDEO_FILE_HEADER_SIZE, header::VideoFileHeader,
    header_for,
};
use crate::{config::AudioFormat, error::ContainerError, framebuffer::PackedFrame};

type Result<T> = core::result::Result<T, ContainerError>;

#[derive(Debug, Clone, Copy)]
pub struct VideoFile<'a> {
    frame_count: u32,
    frames: &'a [u8],
    file_len: u64,
}

impl<'a> VideoFile<'a> {
    /// Reads the frame count and slices out the frames. Trailing bytes are
    /// ignored; see [`VideoFile::is_exact_size`].
    pub fn parse(raw: &'a [u8]) -> Result<Self> {
        let (header, rest) = VideoFileHeader::read_from_prefix(raw)
            .map_err(|_| ContainerError::TruncatedHeader { actual: raw.len() })?;
        let frame_count = header.frame_count.get();
        if frame_count == 0 {
            return Err(ContainerError::EmptyVideo);
        }
        let video_size = frame_count as u64 * FRAME_SIZE;
        if (rest.len() as u64) < video_size {
            return Err(ContainerError::TruncatedPayload {
                expected: VIDEO_FILE_HEADER_SIZE as u64 + video_size,
                actual: raw.len() as u64,
            });
        }
        Ok(Self {
            frame_count,
            frames: &rest[..video_size as usize],
            file_len: raw.len() as u64,
        })
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// The concatenated packed frames.
    pub fn frames(&self) -> &'a [u8] {
        self.frames
    }

    pub fn is_exact_size(&self) -> bool {
        self.file_len == VIDEO_FILE_HEADER_SIZE as u64 + self.frames.len() as u64
    }
}

/// Serialises frames into the video-only intermediate.
pub fn encode_video_file(frames: &[PackedFrame]) -> Result<Vec<u8>> {
    if frames.is_empty() {
        return Err(ContainerError::EmptyVideo);
    }
    let header = VideoFileHeader {
        frame_count: U32::new(super::checked_u32(frames.len() as u64)?),
    };
    let mut bytes = Vec::with_capacity(VIDEO_FILE_HEADER_SIZE + frames.len() * FRAME_SIZE as usize);
    bytes.extend_from_slice(header.as_bytes());
    for frame in frames {
        bytes.extend_from_slice(frame.as_bytes());
    }
    Ok(bytes)
}

/// Builds the container from the video-only intermediate and raw PCM.
pub fn assemble_from_parts(
    video_file: &[u8],
    pcm: &[u8],
    format: AudioFormat,
) -> Result<ContainerFile> {
    let video = VideoFile::parse(video_file)?;
    if !video.is_exact_size() {
        log::warn!(
            "Video file has {} bytes after its last frame",
            video_file.len() - VIDEO_FILE_HEADER_SIZE - video.frames().len()
        );
    }
    let header = header_for(video.frame_count() as usize, pcm.len(), format)?;
    let mut bytes = Vec::with_capacity(HEADER_SIZE + video.frames().len() + pcm.len());
    bytes.extend_from_slice(&header.encode());
    bytes.extend_from_slice(video.frames());
    bytes.extend_from_slice(pcm);
    info!(
        "Combined {} frames with {} bytes of PCM ({} Hz, {} ch, {} bit)",
        header.frame_count,
        pcm.len(),
        format.sample_rate_hz,
        format.channel_count,
        format.bits_per_sample
    );
    Ok(ContainerFile { header, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{container::assemble, framebuffer::BUFFER_SIZE};
    use alloc::vec;

    #[test]
    fn test_encode_layout() {
        let frames = vec![PackedFrame::from([0xA5; BUFFER_SIZE]); 2];
        let bytes = encode_video_file(&frames).unwrap();
        assert_eq!(bytes.len(), 4 + 2 * BUFFER_SIZE);
        assert_eq!(&bytes[..4], &[2, 0, 0, 0]);
        assert!(bytes[4..].iter().all(|&b| b == 0xA5));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            VideoFile::parse(&[1, 0]).unwrap_err(),
            ContainerError::TruncatedHeader { actual: 2 }
        );
        assert_eq!(
            VideoFile::parse(&[0, 0, 0, 0]).unwrap_err(),
            ContainerError::EmptyVideo
        );
        let mut short = vec![0u8; 4 + BUFFER_SIZE];
        short[0] = 2;
        assert_eq!(
            VideoFile::parse(&short).unwrap_err(),
            ContainerError::TruncatedPayload {
                expected: 4 + 2 * BUFFER_SIZE as u64,
                actual: 4 + BUFFER_SIZE as u64,
            }
        );
    }

    #[test]
    fn test_parse_trailing() {
        let mut bytes = encode_video_file(&[PackedFrame::default()]).unwrap();
        assert!(VideoFile::parse(&bytes).unwrap().is_exact_size());
        bytes.push(0);
        let video = VideoFile::parse(&bytes).unwrap();
        assert!(!video.is_exact_size());
        assert_eq!(video.frames().len(), BUFFER_SIZE);
    }

    #[test]
    fn test_assemble_from_parts_matches_assemble() {
        let mut frame = PackedFrame::default();
        frame.set(3, 4, true);
        let frames = vec![frame, PackedFrame::from([0xFF; BUFFER_SIZE])];
        let pcm: Vec<u8> = (0..64u8).collect();
        let format = AudioFormat::default();

        let video_file = encode_video_file(&frames).unwrap();
        let combined = assemble_from_parts(&video_file, &pcm, format).unwrap();
        let direct = assemble(&frames, &pcm, format).unwrap();
        assert_eq!(combined, direct);
    }
}
