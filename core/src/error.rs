use core::fmt;

/// Error returned when a raster cannot be packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackError {
    ShapeMismatch { width: usize, height: usize },
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackError::ShapeMismatch { width, height } => write!(
                f,
                "raster is {}x{}, expected {}x{}",
                width,
                height,
                crate::framebuffer::WIDTH,
                crate::framebuffer::HEIGHT
            ),
        }
    }
}

impl core::error::Error for PackError {}

/// Error type for container assembly and parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    TruncatedHeader { actual: usize },
    TruncatedPayload { expected: u64, actual: u64 },
    EmptyVideo,
    /// A section does not fit the 32-bit size fields of the header.
    PayloadTooLarge { len: u64 },
    IoError(embedded_io::ErrorKind),
}

impl ContainerError {
    pub fn from_io_error(error: impl embedded_io::Error) -> Self {
        ContainerError::IoError(error.kind())
    }
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::TruncatedHeader { actual } => {
                write!(f, "header truncated ({} bytes)", actual)
            }
            ContainerError::TruncatedPayload { expected, actual } => write!(
                f,
                "payload truncated: expected {} bytes, got {}",
                expected, actual
            ),
            ContainerError::EmptyVideo => f.write_str("no video frames"),
            ContainerError::PayloadTooLarge { len } => {
                write!(f, "section of {} bytes exceeds the format limit", len)
            }
            ContainerError::IoError(kind) => write!(f, "io error: {:?}", kind),
        }
    }
}

impl core::error::Error for ContainerError {}

impl embedded_io::Error for ContainerError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            ContainerError::IoError(kind) => *kind,
            ContainerError::TruncatedHeader { .. } | ContainerError::TruncatedPayload { .. } => {
                embedded_io::ErrorKind::InvalidData
            }
            ContainerError::EmptyVideo | ContainerError::PayloadTooLarge { .. } => {
                embedded_io::ErrorKind::InvalidInput
            }
        }
    }
}
