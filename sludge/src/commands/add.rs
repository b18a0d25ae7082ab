use std::path::{Path, PathBuf};

use sludge_format::SludgeWriter;

use crate::cli::AddArgs;
use crate::error::{Error, Result};
use crate::util::format_size;

pub fn run(args: AddArgs) -> Result<()> {
    if args.files.is_empty() {
        return Err(Error::NoFilesSpecified);
    }

    refuse_self(&args.archive, &args.files)?;
    tracing::debug!(archive = %args.archive.display(), files = args.files.len(), "adding files");

    let mut writer = SludgeWriter::open(&args.archive).map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    let stats = writer
        .add_many(&args.files)
        .map_err(|source| Error::AddFiles {
            path: args.archive.clone(),
            source,
        })?;
    tracing::info!(
        files = stats.files_added,
        bytes = stats.bytes_written,
        "add complete"
    );

    if !args.quiet {
        println!(
            "Added {} files ({}) to {}",
            stats.files_added,
            format_size(stats.bytes_written),
            args.archive.display()
        );
    }

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn refuse_self(archive: &Path, files: &[PathBuf]) -> Result<()> {
    if files.iter().any(|file| same_file(archive, file)) {
        return Err(Error::ArchiveIntoItself {
            path: archive.to_path_buf(),
        });
    }
    Ok(())
}
