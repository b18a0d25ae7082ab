use std::io::{ErrorKind, Read, Seek};

use crate::parse::parse_record_header;
use crate::record::{RecordHeader, RECORD_HEADER_LEN};

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Corrupt record header at offset {offset:#x} (read {read} of {expected} bytes).")]
    Corrupt {
        offset: u64,
        read: usize,
        expected: usize,
    },

    #[error("Record at offset {offset:#x} claims a payload past the end of the archive ({len:#x}).")]
    Truncated { offset: u64, len: u64 },

    #[error("Record at offset {offset:#x} has an impossible payload size ({size}).")]
    SizeOverflow { offset: u64, size: u64 },

    #[error("Reading archive records failed.")]
    Io(#[from] std::io::Error),
}

/// Reads as many bytes as are available into `buf`, stopping early only at end of file.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}

/// Decodes the record header at the current position.
///
/// Returns `Ok(None)` when the stream is already at end of file, which is how a
/// scan terminates. A header that is only partially present is corruption.
pub fn read_record_header<R: Read + Seek>(
    reader: &mut R,
) -> Result<Option<RecordHeader>, ScanError> {
    let start = reader.stream_position()?;
    let mut buf = [0u8; RECORD_HEADER_LEN];
    let read = read_full(reader, &mut buf)?;

    if read == 0 {
        tracing::debug!(start = format_args!("{:#x}", start), "end of records");
        return Ok(None);
    }

    if read < RECORD_HEADER_LEN {
        return Err(ScanError::Corrupt {
            offset: start,
            read,
            expected: RECORD_HEADER_LEN,
        });
    }

    let (header, _) = parse_record_header(&buf).map_err(std::io::Error::from)?;

    tracing::debug!(
        start = format_args!("{:#x}", start),
        size = header.size,
        name = %header.name,
        "deserialized RecordHeader"
    );

    Ok(Some(header))
}
