use std::io::{Read, Write};

use crate::parse::parse_magic;

// Trailing NUL is part of the token and is compared like every other byte.
pub const MAGIC_BYTES: &[u8; 10] = b"Sludge0.1\0";

/// Length of the archive header, which is only the magic token.
pub const HEADER_LEN: u64 = MAGIC_BYTES.len() as u64;

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("Could not read header. Is this a valid sludge archive?")]
    Missing(#[source] std::io::Error),

    #[error("Not a sludge archive (magic bytes mismatch).")]
    BadMagic([u8; MAGIC_BYTES.len()]),
}

/// Reads the magic token at the current position and checks it byte for byte.
pub(crate) fn read_magic<R: Read>(reader: &mut R) -> Result<(), HeaderError> {
    let mut buf = [0u8; MAGIC_BYTES.len()];
    reader.read_exact(&mut buf).map_err(HeaderError::Missing)?;

    parse_magic(&buf).map_err(|_| HeaderError::BadMagic(buf))?;

    tracing::debug!(bytes = buf.len(), "validated magic header");
    Ok(())
}

pub(crate) fn write_magic<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writer.write_all(MAGIC_BYTES)?;
    tracing::debug!(bytes = MAGIC_BYTES.len(), "wrote magic header");
    Ok(())
}
