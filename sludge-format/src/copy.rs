//! Bounded copying of payload bytes between streams.
//!
//! Payloads are moved through a fixed-size buffer so that neither appending nor
//! extracting ever holds a whole file in memory.

use std::io::{ErrorKind, Read, Write};

/// Size of the stack buffer used by [`copy_exact`].
pub const COPY_BUFFER_SIZE: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("Reading failed after {copied} bytes.")]
    Read {
        #[source]
        source: std::io::Error,
        copied: u64,
    },

    #[error("Writing failed after {copied} bytes.")]
    Write {
        #[source]
        source: std::io::Error,
        copied: u64,
    },

    #[error("Source ended after {copied} of {expected} bytes.")]
    SourceExhausted { expected: u64, copied: u64 },
}

impl CopyError {
    /// Bytes moved to the destination before the failure.
    pub fn copied(&self) -> u64 {
        match self {
            CopyError::Read { copied, .. }
            | CopyError::Write { copied, .. }
            | CopyError::SourceExhausted { copied, .. } => *copied,
        }
    }
}

/// Copies exactly `len` bytes from `reader` to `writer`.
///
/// Fails if the reader ends early; every chunk is written in full or the copy
/// fails. Returns the number of bytes copied, which is always `len` on success.
pub fn copy_exact<R, W>(reader: &mut R, writer: &mut W, len: u64) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; COPY_BUFFER_SIZE];
    copy_exact_with_buffer(reader, writer, len, &mut buf)
}

/// Same as [`copy_exact`], using the caller's buffer for each chunk.
///
/// # Panics
///
/// Panics if `buf` is empty.
pub fn copy_exact_with_buffer<R, W>(
    reader: &mut R,
    writer: &mut W,
    len: u64,
    buf: &mut [u8],
) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    assert!(!buf.is_empty(), "copy buffer must not be empty");

    let mut copied = 0u64;
    while copied < len {
        let chunk = (len - copied).min(buf.len() as u64) as usize;
        let n = match reader.read(&mut buf[..chunk]) {
            Ok(0) => {
                return Err(CopyError::SourceExhausted {
                    expected: len,
                    copied,
                })
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(CopyError::Read { source, copied }),
        };

        writer
            .write_all(&buf[..n])
            .map_err(|source| CopyError::Write { source, copied })?;
        copied += n as u64;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Hands out at most three bytes per read.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(3).min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn copies_more_than_one_buffer() {
        let data: Vec<u8> = (0..COPY_BUFFER_SIZE * 3 + 17).map(|i| i as u8).collect();
        let mut out = Vec::new();
        let n = copy_exact(&mut Cursor::new(&data), &mut out, data.len() as u64).unwrap();
        assert_eq!(n, data.len() as u64);
        assert_eq!(out, data);
    }

    #[test]
    fn stops_at_len() {
        let mut src = Cursor::new(b"hello world".to_vec());
        let mut out = Vec::new();
        copy_exact_with_buffer(&mut src, &mut out, 5, &mut [0u8; 2]).unwrap();
        assert_eq!(out, b"hello");
        assert_eq!(src.position(), 5);
    }

    #[test]
    fn zero_len_reads_nothing() {
        let mut src = Cursor::new(b"abc".to_vec());
        let mut out = Vec::new();
        assert_eq!(copy_exact(&mut src, &mut out, 0).unwrap(), 0);
        assert_eq!(src.position(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn short_reads_are_continued() {
        let mut out = Vec::new();
        copy_exact(&mut Trickle(b"abcdefgh"), &mut out, 8).unwrap();
        assert_eq!(out, b"abcdefgh");
    }

    #[test]
    fn exhausted_source_reports_progress() {
        let mut out = Vec::new();
        let err = copy_exact(&mut Cursor::new(b"abc".to_vec()), &mut out, 10).unwrap_err();
        assert!(matches!(
            err,
            CopyError::SourceExhausted {
                expected: 10,
                copied: 3
            }
        ));
        assert_eq!(out, b"abc");
    }

    #[test]
    fn failed_write_is_fatal() {
        let err = copy_exact(&mut Cursor::new(b"abc".to_vec()), &mut FailingWriter, 3).unwrap_err();
        assert!(matches!(err, CopyError::Write { copied: 0, .. }));
        assert_eq!(err.copied(), 0);
    }
}
