use alloc::{vec, vec::Vec};

use embedded_io::{Read, Write};

use crate::{
    config::AudioFormat,
    container::{ContainerHeader, VIDEO_FILE_HEADER_SIZE, header_for},
    error::ContainerError,
    framebuffer::PackedFrame,
};

type Result<T> = core::result::Result<T, ContainerError>;

/// Streams a complete container into `writer`.
pub fn write_container<W: Write>(
    writer: &mut W,
    frames: &[PackedFrame],
    audio: &[u8],
    format: AudioFormat,
) -> Result<ContainerHeader> {
    let header = header_for(frames.len(), audio.len(), format)?;
    writer
        .write_all(&header.encode())
        .map_err(ContainerError::from_io_error)?;
    for frame in frames {
        writer
            .write_all(frame.as_bytes())
            .map_err(ContainerError::from_io_error)?;
    }
    writer.write_all(audio).map_err(ContainerError::from_io_error)?;
    writer.flush().map_err(ContainerError::from_io_error)?;
    Ok(header)
}

/// Streams the video-only intermediate into `writer`.
pub fn write_video_file<W: Write>(writer: &mut W, frames: &[PackedFrame]) -> Result<()> {
    if frames.is_empty() {
        return Err(ContainerError::EmptyVideo);
    }
    let count = crate::container::checked_u32(frames.len() as u64)?;
    let mut header = [0u8; VIDEO_FILE_HEADER_SIZE];
    header.copy_from_slice(&count.to_le_bytes());
    writer.write_all(&header).map_err(ContainerError::from_io_error)?;
    for frame in frames {
        writer
            .write_all(frame.as_bytes())
            .map_err(ContainerError::from_io_error)?;
    }
    writer.flush().map_err(ContainerError::from_io_error)
}

/// Reads exactly `len` bytes from `reader`.
pub fn read_to_end<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let read = reader
            .read(&mut buf[filled..])
            .map_err(ContainerError::from_io_error)?;
        if read == 0 {
            return Err(ContainerError::TruncatedPayload {
                expected: len as u64,
                actual: filled as u64,
            });
        }
        filled += read;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        container::{assemble, encode_video_file},
        framebuffer::BUFFER_SIZE,
    };

    #[test]
    fn test_write_container_matches_assemble() {
        let frames = vec![PackedFrame::from([0x0F; BUFFER_SIZE]); 3];
        let audio = [1u8, 0, 2, 0];
        let mut out = Vec::new();
        let header = write_container(&mut out, &frames, &audio, AudioFormat::default()).unwrap();
        let file = assemble(&frames, &audio, AudioFormat::default()).unwrap();
        assert_eq!(&header, file.header());
        assert_eq!(out, file.as_bytes());
    }

    #[test]
    fn test_write_video_file_matches_encode() {
        let frames = vec![PackedFrame::default(); 2];
        let mut out = Vec::new();
        write_video_file(&mut out, &frames).unwrap();
        assert_eq!(out, encode_video_file(&frames).unwrap());
        assert_eq!(
            write_video_file(&mut Vec::<u8>::new(), &[]),
            Err(ContainerError::EmptyVideo)
        );
    }

    #[test]
    fn test_read_to_end() {
        let data = [7u8; 10];
        let mut reader = &data[..];
        assert_eq!(read_to_end(&mut reader, 10).unwrap(), data);

        let mut reader = &data[..];
        assert_eq!(
            read_to_end(&mut reader, 12),
            Err(ContainerError::TruncatedPayload {
                expected: 12,
                actual: 10
            })
        );
    }
}
