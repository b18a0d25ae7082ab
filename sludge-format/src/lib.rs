//! Herein lies the brains of the `sludge` archive format.
//!
//! A sludge archive is a 10-byte magic header followed by records, each a
//! fixed-width header (250-byte name, little-endian `u64` size) and exactly
//! `size` bytes of payload. There is no index; records are found by scanning.
//!
//! Use [SludgeReader] to list and extract, and [SludgeWriter] to create and append.

pub mod copy;
mod de;
pub mod encode;
mod file;
pub mod header;
pub mod parse;
mod record;
mod ser;

pub use copy::{copy_exact, CopyError};
pub use de::{read_record_header, ScanError};
#[cfg(feature = "reader")]
pub use file::reader::{ExtractError, ExtractProgress, ExtractStats, SludgeReader};
#[cfg(feature = "writer")]
pub use file::writer::{AddStats, AppendError, SludgeWriter};
pub use file::{OpenError, Records};
pub use header::{HeaderError, HEADER_LEN, MAGIC_BYTES};
pub use record::{Entry, RecordHeader, RecordName, NAME_LEN, RECORD_HEADER_LEN, SIZE_LEN};
pub use ser::write_record_header;
