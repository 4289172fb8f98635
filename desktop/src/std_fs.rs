use std::{
    fs,
    io::{Read, Seek, Write},
    path::{Path, PathBuf},
};

use embedded_io::{ErrorType, SeekFrom};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Mode {
    Read,
    Write,
}

/// A std file exposed through the embedded-io traits the core streams with.
pub struct StdFile {
    file: std::io::BufWriter<fs::File>,
    size: usize,
    path: PathBuf,
}

impl StdFile {
    pub fn open(path: impl AsRef<Path>, mode: Mode) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = match mode {
            Mode::Read => fs::OpenOptions::new().read(true).open(&path)?,
            Mode::Write => fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?,
        };
        let size = file.seek(std::io::SeekFrom::End(0))? as usize;
        file.seek(std::io::SeekFrom::Start(0))?;
        info!("Opened {:?} ({:?}, {} bytes)", path, mode, size);
        Ok(StdFile {
            file: std::io::BufWriter::new(file),
            size,
            path,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ErrorType for StdFile {
    type Error = std::io::Error;
}

impl embedded_io::Seek for StdFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos.into())
    }
}

impl embedded_io::Read for StdFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.get_mut().read(buf)
    }
}

impl embedded_io::Write for StdFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

/// Reads a whole file through the core's stream helper.
#[allow(dead_code)]
pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<u8>, pagevid_core::error::ContainerError> {
    let mut file = StdFile::open(path, Mode::Read)
        .map_err(pagevid_core::error::ContainerError::from_io_error)?;
    let size = file.size();
    pagevid_core::io::read_to_end(&mut file, size)
}
