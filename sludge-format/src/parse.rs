//! Sans-IO parsing primitives for the sludge format.
//!
//! These functions work on byte slices without any I/O traits. All functions
//! return `(value, bytes_consumed)` on success, allowing the caller to manage
//! buffer positions.

use byteorder::{ByteOrder, LittleEndian};

use crate::header::MAGIC_BYTES;
use crate::record::{RecordHeader, RecordName, NAME_LEN, RECORD_HEADER_LEN, SIZE_LEN};

/// Error type for parsing operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Need more bytes to complete parsing. Contains minimum additional bytes needed.
    #[error("need {0} more bytes")]
    NeedMoreBytes(usize),

    #[error("invalid data: {0}")]
    InvalidData(&'static str),
}

impl From<ParseError> for std::io::Error {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::NeedMoreBytes(_) => {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, e)
            }
            ParseError::InvalidData(_) => std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        }
    }
}

pub type ParseResult<T> = Result<(T, usize), ParseError>;

/// Parse a little-endian u64.
#[inline]
pub fn parse_u64_le(data: &[u8]) -> ParseResult<u64> {
    if data.len() < 8 {
        return Err(ParseError::NeedMoreBytes(8 - data.len()));
    }
    Ok((LittleEndian::read_u64(&data[..8]), 8))
}

/// Parse the fixed-width name field. The name ends at the first NUL, or spans
/// the whole field when there is none.
pub fn parse_name(data: &[u8]) -> ParseResult<RecordName> {
    if data.len() < NAME_LEN {
        return Err(ParseError::NeedMoreBytes(NAME_LEN - data.len()));
    }
    Ok((RecordName::new(&data[..NAME_LEN]), NAME_LEN))
}

/// Parse the archive's magic header.
pub fn parse_magic(data: &[u8]) -> ParseResult<()> {
    if data.len() < MAGIC_BYTES.len() {
        return Err(ParseError::NeedMoreBytes(MAGIC_BYTES.len() - data.len()));
    }
    if &data[..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(ParseError::InvalidData("magic bytes invalid"));
    }
    Ok(((), MAGIC_BYTES.len()))
}

/// Parse a complete record header (name field then size field).
pub fn parse_record_header(data: &[u8]) -> ParseResult<RecordHeader> {
    if data.len() < RECORD_HEADER_LEN {
        return Err(ParseError::NeedMoreBytes(RECORD_HEADER_LEN - data.len()));
    }

    let (name, name_len) = parse_name(data)?;
    let (size, size_len) = parse_u64_le(&data[name_len..])?;
    debug_assert_eq!(size_len, SIZE_LEN);

    Ok((RecordHeader { name, size }, name_len + size_len))
}
