use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{find, following, record_at, OpenError, Records};
use crate::copy::{copy_exact, CopyError};
use crate::de::ScanError;
use crate::header::{read_magic, HEADER_LEN};
use crate::record::{Entry, RecordName};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Refusing to overwrite existing file. Path: '{}'", .0.display())]
    WouldOverwrite(PathBuf),

    #[error("Name not found in archive. Name: '{0}'")]
    NotFoundInArchive(String),

    #[error("Record name is not a plain file name. Name: '{0}'")]
    UnsafeName(RecordName),

    #[error("Creating file failed. Path: '{}'", .1.display())]
    CreateFileFailed(#[source] std::io::Error, PathBuf),

    #[error("Copying record data failed. Path: '{}'", .1.display())]
    CopyFailed(#[source] CopyError, PathBuf),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Statistics from extracting files from an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Number of files extracted.
    pub files_extracted: u64,
    /// Total payload bytes written.
    pub bytes_written: u64,
}

/// Progress events reported while extracting.
#[derive(Debug)]
pub enum ExtractProgress<'a> {
    Extracting { name: &'a RecordName, path: &'a Path },
    Extracted { name: &'a RecordName, bytes: u64 },
}

/// Read-only session over a sludge archive.
#[derive(Debug)]
pub struct SludgeReader<F = File> {
    pub(crate) file: F,
    pub(crate) path: Option<PathBuf>,
}

impl SludgeReader<File> {
    /// Opens an existing archive and validates its magic header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SludgeReader<File>, OpenError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| OpenError::ReadFailed(e, path.clone()))?;

        let mut reader = SludgeReader::from_stream(file)?;
        reader.path = Some(path);
        Ok(reader)
    }
}

impl<F: Read + Seek> SludgeReader<F> {
    /// Wraps any seekable stream, validating the magic header at its start.
    pub fn from_stream(mut file: F) -> Result<SludgeReader<F>, OpenError> {
        file.seek(SeekFrom::Start(0)).map_err(OpenError::Seek)?;
        read_magic(&mut file)?;
        Ok(SludgeReader { file, path: None })
    }

    /// The path this archive was opened from, if it was opened from a path.
    #[inline(always)]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn into_inner(self) -> F {
        self.file
    }

    /// Iterates over every record, in the order they were appended.
    pub fn records(&mut self) -> Records<'_, F> {
        Records::new(&mut self.file)
    }

    /// Looks up a record by exact name. The cursor is unchanged afterwards.
    pub fn find<N: AsRef<[u8]>>(&mut self, name: N) -> Result<Option<Entry>, ScanError> {
        find(&mut self.file, name.as_ref())
    }

    /// Copies the payload of `entry` into `dest`.
    pub fn read_payload<W: Write + ?Sized>(
        &mut self,
        entry: &Entry,
        dest: &mut W,
    ) -> Result<u64, CopyError> {
        self.file
            .seek(SeekFrom::Start(entry.offset))
            .map_err(|source| CopyError::Read { source, copied: 0 })?;
        copy_exact(&mut self.file, dest, entry.size())
    }

    /// Extracts the record named `name` into `dest`.
    ///
    /// Fails without touching the filesystem if a file of that name already
    /// exists in `dest`, or if the archive has no such record.
    pub fn extract_one<N: AsRef<[u8]>, P: AsRef<Path>>(
        &mut self,
        name: N,
        dest: P,
    ) -> Result<u64, ExtractError> {
        self.extract_one_inner(name.as_ref(), dest.as_ref(), &mut ignore_progress)
    }

    /// Extracts every record into `dest`, stopping at the first failure.
    ///
    /// Files extracted before a failure are left in place.
    pub fn extract_all<P: AsRef<Path>>(&mut self, dest: P) -> Result<ExtractStats, ExtractError> {
        self.extract_all_inner(dest.as_ref(), &mut ignore_progress)
    }

    /// Extracts the named records in the given order, or every record when
    /// `names` is empty.
    pub fn extract<N: AsRef<[u8]>, P: AsRef<Path>>(
        &mut self,
        names: &[N],
        dest: P,
    ) -> Result<ExtractStats, ExtractError> {
        self.extract_with_progress(names, dest, ignore_progress)
    }

    pub fn extract_with_progress<N, P, C>(
        &mut self,
        names: &[N],
        dest: P,
        mut progress: C,
    ) -> Result<ExtractStats, ExtractError>
    where
        N: AsRef<[u8]>,
        P: AsRef<Path>,
        C: FnMut(ExtractProgress<'_>),
    {
        let dest = dest.as_ref();

        if names.is_empty() {
            return self.extract_all_inner(dest, &mut progress);
        }

        let mut stats = ExtractStats::default();
        for name in names {
            stats.bytes_written += self.extract_one_inner(name.as_ref(), dest, &mut progress)?;
            stats.files_extracted += 1;
        }
        Ok(stats)
    }

    fn extract_one_inner(
        &mut self,
        name: &[u8],
        dest: &Path,
        progress: &mut dyn FnMut(ExtractProgress<'_>),
    ) -> Result<u64, ExtractError> {
        let not_found = || ExtractError::NotFoundInArchive(String::from_utf8_lossy(name).into());

        // A name that does not survive normalization can never have been stored.
        let record_name = RecordName::new(name);
        if record_name.as_bytes() != name {
            return Err(not_found());
        }

        let path = output_path(&record_name, dest)?;
        refuse_existing(&path)?;

        let entry = self.find(name)?.ok_or_else(not_found)?;
        self.write_entry(&entry, &path, progress)
    }

    fn extract_all_inner(
        &mut self,
        dest: &Path,
        progress: &mut dyn FnMut(ExtractProgress<'_>),
    ) -> Result<ExtractStats, ExtractError> {
        let mut stats = ExtractStats::default();
        let mut next = HEADER_LEN;

        while let Some(entry) = record_at(&mut self.file, next)? {
            next = following(&entry)?;
            let path = output_path(entry.name(), dest)?;
            refuse_existing(&path)?;

            stats.bytes_written += self.write_entry(&entry, &path, progress)?;
            stats.files_extracted += 1;
        }

        Ok(stats)
    }

    fn write_entry(
        &mut self,
        entry: &Entry,
        path: &Path,
        progress: &mut dyn FnMut(ExtractProgress<'_>),
    ) -> Result<u64, ExtractError> {
        let mut out = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => ExtractError::WouldOverwrite(path.to_path_buf()),
                _ => ExtractError::CreateFileFailed(e, path.to_path_buf()),
            })?;

        progress(ExtractProgress::Extracting {
            name: entry.name(),
            path,
        });

        let bytes = self
            .read_payload(entry, &mut out)
            .map_err(|e| ExtractError::CopyFailed(e, path.to_path_buf()))?;

        tracing::info!(
            name = %entry.name(),
            bytes,
            path = %path.display(),
            "extracted record"
        );
        progress(ExtractProgress::Extracted {
            name: entry.name(),
            bytes,
        });

        Ok(bytes)
    }
}

fn ignore_progress(_: ExtractProgress<'_>) {}

fn output_path(name: &RecordName, dest: &Path) -> Result<PathBuf, ExtractError> {
    name.to_path_component()
        .map(|component| dest.join(component))
        .ok_or_else(|| ExtractError::UnsafeName(name.clone()))
}

fn refuse_existing(path: &Path) -> Result<(), ExtractError> {
    if path.symlink_metadata().is_ok() {
        tracing::warn!(path = %path.display(), "refusing to overwrite existing file");
        return Err(ExtractError::WouldOverwrite(path.to_path_buf()));
    }
    Ok(())
}
