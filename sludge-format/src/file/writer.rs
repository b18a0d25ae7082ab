use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{find, OpenError, Records};
use crate::copy::{copy_exact, CopyError};
use crate::de::ScanError;
use crate::header::{read_magic, write_magic};
use crate::record::{Entry, RecordHeader, RecordName, RECORD_HEADER_LEN};
use crate::ser::write_record_header;

#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    #[error("Archive already contains a file named '{0}'.")]
    Duplicate(RecordName),

    #[error("Path has no usable file name. Path: '{}'", .0.display())]
    InvalidName(PathBuf),

    #[error("Record names must not be empty.")]
    EmptyName,

    #[error("Path is not a regular file. Path: '{}'", .0.display())]
    NotAFile(PathBuf),

    #[error("Reading file metadata failed. Path: '{}'", .1.display())]
    Stat(#[source] std::io::Error, PathBuf),

    #[error("Opening file failed. Path: '{}'", .1.display())]
    OpenSource(#[source] std::io::Error, PathBuf),

    #[error("Seeking to the end of the archive failed.")]
    Seek(#[source] std::io::Error),

    #[error("Writing record header failed. Name: '{1}'")]
    WriteHeader(#[source] std::io::Error, RecordName),

    #[error("Copying file data into the archive failed. Name: '{1}'")]
    CopyFailed(#[source] CopyError, RecordName),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Statistics from adding files to an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddStats {
    /// Number of records appended.
    pub files_added: u64,
    /// Total payload bytes appended, excluding record headers.
    pub bytes_written: u64,
}

/// Append session over a sludge archive.
///
/// Records are only ever added at the end of the file; nothing already written
/// is modified. Only one writer may hold an archive at a time.
#[derive(Debug)]
pub struct SludgeWriter<F = File> {
    pub(crate) file: F,
    pub(crate) path: Option<PathBuf>,
}

impl SludgeWriter<File> {
    /// Opens an existing archive for appending, or creates it if it does not exist.
    ///
    /// An existing file must carry a valid magic header. Either way the
    /// session is left at end of file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SludgeWriter<File>, OpenError> {
        let path = path.as_ref();

        match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => {
                let mut writer = SludgeWriter::from_stream(file)?;
                writer.path = Some(path.to_path_buf());
                Ok(writer)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => SludgeWriter::create_new(path),
            Err(e) => Err(OpenError::ReadFailed(e, path.to_path_buf())),
        }
    }

    /// Creates a new, empty archive, and errors if the file already exists.
    pub fn create_new<P: AsRef<Path>>(path: P) -> Result<SludgeWriter<File>, OpenError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| OpenError::CreateFailed(e, path.to_path_buf()))?;

        let mut writer = SludgeWriter::new(file)?;
        writer.path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), "created archive");
        Ok(writer)
    }
}

impl<F: Read + Write + Seek> SludgeWriter<F> {
    /// Starts a new archive in an empty stream by writing the magic header.
    pub fn new(mut file: F) -> Result<SludgeWriter<F>, OpenError> {
        file.seek(SeekFrom::Start(0)).map_err(OpenError::Seek)?;
        write_magic(&mut file).map_err(OpenError::WriteHeader)?;
        file.flush().map_err(OpenError::WriteHeader)?;
        Ok(SludgeWriter { file, path: None })
    }

    /// Resumes an existing archive, validating the magic header and seeking to
    /// end of file.
    pub fn from_stream(mut file: F) -> Result<SludgeWriter<F>, OpenError> {
        file.seek(SeekFrom::Start(0)).map_err(OpenError::Seek)?;
        read_magic(&mut file)?;
        file.seek(SeekFrom::End(0)).map_err(OpenError::Seek)?;
        Ok(SludgeWriter { file, path: None })
    }

    #[inline(always)]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn into_inner(self) -> F {
        self.file
    }

    pub fn records(&mut self) -> Records<'_, F> {
        Records::new(&mut self.file)
    }

    /// Looks up a record by exact name. The cursor is unchanged afterwards.
    pub fn find<N: AsRef<[u8]>>(&mut self, name: N) -> Result<Option<Entry>, ScanError> {
        find(&mut self.file, name.as_ref())
    }

    /// Appends the file at `path` as a record named after its base name.
    ///
    /// This does not check for duplicates; see [`SludgeWriter::add_many`].
    pub fn append<P: AsRef<Path>>(&mut self, path: P) -> Result<Entry, AppendError> {
        let path = path.as_ref();

        let meta = std::fs::metadata(path).map_err(|e| AppendError::Stat(e, path.to_path_buf()))?;
        if !meta.is_file() {
            return Err(AppendError::NotAFile(path.to_path_buf()));
        }

        let name =
            RecordName::from_path(path).ok_or_else(|| AppendError::InvalidName(path.to_path_buf()))?;
        let mut file = File::open(path).map_err(|e| AppendError::OpenSource(e, path.to_path_buf()))?;

        self.append_reader(name, &mut file, meta.len())
    }

    /// Appends `len` bytes read from `reader` as a record named `name`.
    ///
    /// A failure after the header is written leaves an incomplete record at the
    /// end of the archive; later scans report it as truncated.
    pub fn append_reader<R: Read + ?Sized>(
        &mut self,
        name: RecordName,
        reader: &mut R,
        len: u64,
    ) -> Result<Entry, AppendError> {
        if name.is_empty() {
            return Err(AppendError::EmptyName);
        }

        let start = self.file.seek(SeekFrom::End(0)).map_err(AppendError::Seek)?;
        let header = RecordHeader::new(name, len);

        write_record_header(&mut self.file, &header)
            .map_err(|e| AppendError::WriteHeader(e, header.name.clone()))?;
        copy_exact(reader, &mut self.file, len)
            .map_err(|e| AppendError::CopyFailed(e, header.name.clone()))?;
        self.file.flush().map_err(|source| {
            AppendError::CopyFailed(CopyError::Write { source, copied: len }, header.name.clone())
        })?;

        tracing::info!(
            name = %header.name,
            size = len,
            start = format_args!("{:#x}", start),
            "appended record"
        );

        Ok(Entry {
            header,
            offset: start + RECORD_HEADER_LEN as u64,
        })
    }

    /// Appends each file in order, rejecting any whose name is already present.
    ///
    /// Stops at the first duplicate or failure. Files appended before that
    /// point stay in the archive.
    pub fn add_many<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<AddStats, AppendError> {
        let mut stats = AddStats::default();

        for path in paths {
            let path = path.as_ref();
            let name = RecordName::from_path(path)
                .ok_or_else(|| AppendError::InvalidName(path.to_path_buf()))?;

            if self.find(&name)?.is_some() {
                tracing::warn!(%name, "file already in archive");
                return Err(AppendError::Duplicate(name));
            }

            let entry = self.append(path)?;
            stats.files_added += 1;
            stats.bytes_written += entry.size();
        }

        Ok(stats)
    }
}
