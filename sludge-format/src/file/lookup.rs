use std::io::{Read, Seek, SeekFrom};

use super::Records;
use crate::de::ScanError;
use crate::record::Entry;

/// Finds the first record named exactly `name` by scanning from the first record.
///
/// The cursor is put back where it was on entry, whether or not a record was
/// found, and also when the scan fails.
pub(crate) fn find<R: Read + Seek>(
    reader: &mut R,
    name: &[u8],
) -> Result<Option<Entry>, ScanError> {
    let saved = reader.stream_position()?;
    let found = scan_for(reader, name);
    let restored = reader.seek(SeekFrom::Start(saved));

    tracing::debug!(
        name = %String::from_utf8_lossy(name),
        found = matches!(found, Ok(Some(_))),
        restored = format_args!("{:#x}", saved),
        "lookup"
    );

    match (found, restored) {
        (Err(e), _) => Err(e),
        (Ok(_), Err(e)) => Err(e.into()),
        (Ok(entry), Ok(_)) => Ok(entry),
    }
}

fn scan_for<R: Read + Seek>(reader: &mut R, name: &[u8]) -> Result<Option<Entry>, ScanError> {
    for entry in Records::new(reader) {
        let entry = entry?;
        if entry.name().as_bytes() == name {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}
