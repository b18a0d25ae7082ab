use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Width of the name field on disk.
pub const NAME_LEN: usize = 250;

/// Width of the size field on disk (unsigned 64-bit, little-endian).
pub const SIZE_LEN: usize = 8;

/// Length of an encoded record header: the name field followed by the size field.
pub const RECORD_HEADER_LEN: usize = NAME_LEN + SIZE_LEN;

/// The stored name of a record.
///
/// Names are raw bytes. They never contain a NUL and are never longer than
/// [`NAME_LEN`]; anything past the first NUL or past `NAME_LEN` bytes is dropped
/// on construction, which is exactly what survives an encode/decode cycle.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordName(Vec<u8>);

impl RecordName {
    pub fn new<B: Into<Vec<u8>>>(bytes: B) -> RecordName {
        let mut bytes = bytes.into();
        if let Some(nul) = bytes.iter().position(|b| *b == 0) {
            bytes.truncate(nul);
        }
        bytes.truncate(NAME_LEN);
        RecordName(bytes)
    }

    /// Builds a name from the final component of `path`.
    ///
    /// Returns `None` when the path has no file name (`/`, `..`, empty).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<RecordName> {
        path.as_ref().file_name().map(RecordName::from_os_str)
    }

    pub fn from_os_str(s: &OsStr) -> RecordName {
        RecordName::new(os_str_bytes(s).into_owned())
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Converts the name into a relative path of exactly one normal component.
    ///
    /// Names such as `..`, `a/b` or `/etc/passwd` return `None`, so a record can
    /// never be written outside the directory it is extracted into.
    pub fn to_path_component(&self) -> Option<PathBuf> {
        let path = PathBuf::from(bytes_os_str(&self.0)?);
        let mut components = path.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !self.0.contains(&b'/') => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordName({:?})", self.to_string_lossy())
    }
}

impl AsRef<[u8]> for RecordName {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for RecordName {
    fn from(s: &str) -> RecordName {
        RecordName::new(s.as_bytes())
    }
}

#[cfg(unix)]
fn os_str_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(s.as_bytes())
}

#[cfg(not(unix))]
fn os_str_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    match s.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(unix)]
fn bytes_os_str(bytes: &[u8]) -> Option<&OsStr> {
    use std::os::unix::ffi::OsStrExt;
    Some(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_os_str(bytes: &[u8]) -> Option<&OsStr> {
    std::str::from_utf8(bytes).ok().map(OsStr::new)
}

/// The fixed-layout header preceding every payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub name: RecordName,

    /// The exact number of payload bytes following the header.
    pub size: u64,
}

impl RecordHeader {
    pub fn new(name: RecordName, size: u64) -> RecordHeader {
        RecordHeader { name, size }
    }
}

/// A record located during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub header: RecordHeader,

    /// Byte offset of the first payload byte in the archive.
    pub offset: u64,
}

impl Entry {
    #[inline(always)]
    pub fn name(&self) -> &RecordName {
        &self.header.name
    }

    #[inline(always)]
    pub fn size(&self) -> u64 {
        self.header.size
    }

    /// Offset of this record's header.
    #[inline(always)]
    pub fn header_offset(&self) -> u64 {
        self.offset - RECORD_HEADER_LEN as u64
    }

    /// Offset of the header following this record, or end of file.
    ///
    /// `None` when the stored size runs past the end of the address space,
    /// which only a damaged header can claim.
    #[inline(always)]
    pub fn next_offset(&self) -> Option<u64> {
        self.offset.checked_add(self.header.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_stops_at_nul() {
        let name = RecordName::new(&b"abc\0def"[..]);
        assert_eq!(name.as_bytes(), b"abc");
    }

    #[test]
    fn long_name_truncates() {
        let name = RecordName::new(vec![b'x'; 300]);
        assert_eq!(name.len(), NAME_LEN);
    }

    #[test]
    fn exact_width_name_is_kept() {
        let name = RecordName::new(vec![b'y'; NAME_LEN]);
        assert_eq!(name.as_bytes(), &[b'y'; NAME_LEN][..]);
    }

    #[test]
    fn from_path_uses_base_name() {
        let name = RecordName::from_path("some/dir/a.txt").unwrap();
        assert_eq!(name.as_bytes(), b"a.txt");
        assert!(RecordName::from_path("..").is_none());
    }

    #[test]
    fn path_component_rejects_traversal() {
        assert_eq!(
            RecordName::from("a.txt").to_path_component(),
            Some(PathBuf::from("a.txt"))
        );
        assert!(RecordName::from("..").to_path_component().is_none());
        assert!(RecordName::from(".").to_path_component().is_none());
        assert!(RecordName::from("a/b").to_path_component().is_none());
        assert!(RecordName::from("/etc/passwd").to_path_component().is_none());
        assert!(RecordName::from("").to_path_component().is_none());
    }

    #[test]
    fn entry_offsets() {
        let entry = Entry {
            header: RecordHeader::new("a".into(), 3),
            offset: 10 + RECORD_HEADER_LEN as u64,
        };
        assert_eq!(entry.header_offset(), 10);
        assert_eq!(entry.next_offset(), Some(10 + RECORD_HEADER_LEN as u64 + 3));
    }
}
