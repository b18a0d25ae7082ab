use std::io::Write;

use crate::encode::encode_record_header;
use crate::record::RecordHeader;

/// Writes an encoded record header at the current position.
pub fn write_record_header<W: Write>(writer: &mut W, header: &RecordHeader) -> std::io::Result<()> {
    writer.write_all(&encode_record_header(header))?;
    tracing::debug!(size = header.size, name = %header.name, "serialized RecordHeader");
    Ok(())
}
