//! Archive sessions.
//!
//! A session owns the archive's file handle and its cursor. Records are found
//! by scanning forward from just after the magic header; there is no index.

use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use crate::de::{read_record_header, ScanError};
use crate::header::{HeaderError, HEADER_LEN};
use crate::record::{Entry, RECORD_HEADER_LEN};

mod lookup;
#[cfg(feature = "reader")]
pub mod reader;
#[cfg(feature = "writer")]
pub mod writer;

pub(crate) use lookup::find;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("Failed to open sludge file. Path: '{}'", .1.display())]
    ReadFailed(#[source] std::io::Error, PathBuf),

    #[error("Failed to create sludge file. Path: '{}'", .1.display())]
    CreateFailed(#[source] std::io::Error, PathBuf),

    #[error(transparent)]
    InvalidHeader(#[from] HeaderError),

    #[error("Writing the magic header failed.")]
    WriteHeader(#[source] std::io::Error),

    #[error("Seeking within the archive failed.")]
    Seek(#[source] std::io::Error),
}

/// Decodes the record whose header starts at `offset`, leaving the cursor at
/// the start of its payload.
pub(crate) fn record_at<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
) -> Result<Option<Entry>, ScanError> {
    reader.seek(SeekFrom::Start(offset))?;

    match read_record_header(reader)? {
        Some(header) => Ok(Some(Entry {
            header,
            offset: offset + RECORD_HEADER_LEN as u64,
        })),
        None => {
            // Reading nothing is only a clean end if the previous payload
            // actually reached this far.
            let len = reader.seek(SeekFrom::End(0))?;
            if offset > len {
                return Err(ScanError::Truncated { offset, len });
            }
            Ok(None)
        }
    }
}

/// Offset of the header after `entry`, failing if its size cannot be real.
pub(crate) fn following(entry: &Entry) -> Result<u64, ScanError> {
    entry.next_offset().ok_or(ScanError::SizeOverflow {
        offset: entry.header_offset(),
        size: entry.size(),
    })
}

/// Iterator over the records of an archive, in on-disk order.
///
/// Each yielded [`Entry`] leaves the underlying cursor at the start of that
/// record's payload. The next call seeks past the payload whether or not the
/// caller read it. Iteration stops after the first error.
pub struct Records<'a, R> {
    reader: &'a mut R,
    next: u64,
    done: bool,
}

impl<'a, R: Read + Seek> Records<'a, R> {
    pub(crate) fn new(reader: &'a mut R) -> Records<'a, R> {
        Records {
            reader,
            next: HEADER_LEN,
            done: false,
        }
    }
}

impl<R: Read + Seek> Iterator for Records<'_, R> {
    type Item = Result<Entry, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match record_at(self.reader, self.next).and_then(|r| match r {
            Some(entry) => following(&entry).map(|next| Some((entry, next))),
            None => Ok(None),
        }) {
            Ok(Some((entry, next))) => {
                self.next = next;
                Some(Ok(entry))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_record_header;
    use crate::header::MAGIC_BYTES;
    use crate::record::RecordHeader;
    use std::io::Cursor;

    fn archive(records: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = MAGIC_BYTES.to_vec();
        for (name, payload) in records {
            let header = RecordHeader::new((*name).into(), payload.len() as u64);
            buf.extend_from_slice(&encode_record_header(&header));
            buf.extend_from_slice(payload);
        }
        buf
    }

    #[test]
    fn scans_in_order() {
        let mut cursor = Cursor::new(archive(&[
            ("a", &b"xyz"[..]),
            ("empty", &b""[..]),
            ("b", &b"12"[..]),
        ]));
        let names = Records::new(&mut cursor)
            .map(|r| r.map(|e| (e.name().to_string(), e.size())))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(
            names,
            vec![("a".into(), 3), ("empty".into(), 0), ("b".into(), 2)]
        );
    }

    #[test]
    fn entry_offset_points_at_payload() {
        let bytes = archive(&[("a", &b"xyz"[..])]);
        let mut cursor = Cursor::new(bytes.clone());
        let entry = Records::new(&mut cursor).next().unwrap().unwrap();
        assert_eq!(entry.offset, HEADER_LEN + RECORD_HEADER_LEN as u64);
        assert_eq!(cursor.position(), entry.offset);
        assert_eq!(&bytes[entry.offset as usize..], b"xyz");
    }

    #[test]
    fn empty_archive_has_no_records() {
        let mut cursor = Cursor::new(MAGIC_BYTES.to_vec());
        assert!(Records::new(&mut cursor).next().is_none());
    }

    #[test]
    fn corrupt_trailer_stops_scan() {
        let mut bytes = archive(&[("a", &b"xyz"[..])]);
        bytes.extend_from_slice(b"partial");
        let mut cursor = Cursor::new(bytes);
        let mut records = Records::new(&mut cursor);

        assert!(records.next().unwrap().is_ok());
        assert!(matches!(
            records.next(),
            Some(Err(ScanError::Corrupt { read: 7, .. }))
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn truncated_payload_is_reported() {
        let mut bytes = archive(&[("a", &b"xyz"[..])]);
        bytes.truncate(bytes.len() - 1);
        let mut cursor = Cursor::new(bytes);
        let mut records = Records::new(&mut cursor);

        assert!(records.next().unwrap().is_ok());
        assert!(matches!(
            records.next(),
            Some(Err(ScanError::Truncated { .. }))
        ));
    }

    #[test]
    fn absurd_size_stops_scan() {
        let mut bytes = MAGIC_BYTES.to_vec();
        let header = RecordHeader::new("a".into(), u64::MAX);
        bytes.extend_from_slice(&encode_record_header(&header));
        let mut cursor = Cursor::new(bytes);
        let mut records = Records::new(&mut cursor);

        assert!(matches!(
            records.next(),
            Some(Err(ScanError::SizeOverflow {
                offset: HEADER_LEN,
                size: u64::MAX
            }))
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn size_past_end_is_truncated() {
        let mut bytes = MAGIC_BYTES.to_vec();
        let header = RecordHeader::new("a".into(), u64::MAX - 4096);
        bytes.extend_from_slice(&encode_record_header(&header));
        let mut cursor = Cursor::new(bytes);
        let mut records = Records::new(&mut cursor);

        assert!(records.next().unwrap().is_ok());
        assert!(matches!(
            records.next(),
            Some(Err(ScanError::Truncated { .. }))
        ));
    }
}
