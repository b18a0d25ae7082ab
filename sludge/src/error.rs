use std::path::PathBuf;

use miette::Diagnostic;
use sludge_format::{AppendError, ExtractError, OpenError, ScanError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("Cannot open archive `{}`", .path.display())]
    #[diagnostic(help("Is this a valid .sludge file?"))]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: OpenError,
    },

    #[error("Cannot read records of archive `{}`", .path.display())]
    #[diagnostic(help("The archive may be truncated or corrupt"))]
    ReadArchive {
        path: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error("Cannot add files to archive `{}`", .path.display())]
    #[diagnostic(help("Files added before the failure remain in the archive"))]
    AddFiles {
        path: PathBuf,
        #[source]
        source: AppendError,
    },

    #[error("Cannot extract files")]
    #[diagnostic(help("Files extracted before the failure were left in place"))]
    Extract {
        #[source]
        source: ExtractError,
    },

    #[error("Cannot create directory `{}`", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot determine current directory")]
    CurrentDir {
        #[source]
        source: std::io::Error,
    },

    #[error("Cowardly refusing to add archive `{}` to itself", .path.display())]
    ArchiveIntoItself { path: PathBuf },

    #[error("No files specified to add to archive")]
    #[diagnostic(help("Specify one or more files to archive"))]
    NoFilesSpecified,

    #[error("Cannot serialize listing")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}
