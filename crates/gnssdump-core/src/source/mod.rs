//! Byte sources for the framer.
//!
//! A source exposes "read exactly N bytes or fail"; no seeking or pushback
//! is required (a documented limitation: a single stray sync byte before a
//! real packet causes that packet to be skipped, since the framer cannot
//! un-read). All file I/O lives here; the framer and decoders never touch
//! the filesystem.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pull-based byte access for the framer.
pub trait ByteSource {
    /// Read one byte, or `None` at a clean end of stream.
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError>;

    /// Read exactly `buf.len()` bytes; end of stream mid-read is an error.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SourceError>;
}

/// Byte source over any [`std::io::Read`] implementation.
///
/// # Examples
/// ```
/// use gnssdump_core::{ByteSource, ReaderSource};
///
/// let mut source = ReaderSource::new(&[0x24u8, 0x42][..]);
/// assert_eq!(source.next_byte().unwrap(), Some(0x24));
/// assert_eq!(source.next_byte().unwrap(), Some(0x42));
/// assert_eq!(source.next_byte().unwrap(), None);
/// ```
pub struct ReaderSource<R: Read> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let mut byte = [0u8; 1];
        loop {
            return match self.inner.read(&mut byte) {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(byte[0])),
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => Err(SourceError::Io(err)),
            };
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        self.inner.read_exact(buf)?;
        Ok(())
    }
}

/// Buffered byte source over a capture file.
pub struct FileSource {
    inner: ReaderSource<BufReader<File>>,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self {
            inner: ReaderSource::new(BufReader::new(file)),
        })
    }
}

impl ByteSource for FileSource {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        self.inner.next_byte()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        self.inner.read_exact(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_exact_fills_buffer() {
        let mut source = ReaderSource::new(&[1u8, 2, 3, 4][..]);
        let mut buf = [0u8; 3];
        source.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(source.next_byte().unwrap(), Some(4));
    }

    #[test]
    fn read_exact_past_end_is_an_error() {
        let mut source = ReaderSource::new(&[1u8][..]);
        let mut buf = [0u8; 2];
        let err = source.read_exact(&mut buf).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
