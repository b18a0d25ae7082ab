use sludge_format::{ExtractProgress, SludgeReader};

use crate::cli::ExtractArgs;
use crate::error::{Error, Result};
use crate::util::format_size;

pub fn run(args: ExtractArgs) -> Result<()> {
    let mut reader = SludgeReader::open(&args.archive).map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    let output_path = match args.output {
        Some(path) => path,
        None => std::env::current_dir().map_err(|source| Error::CurrentDir { source })?,
    };

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(&output_path).map_err(|source| Error::CreateDirectory {
        path: output_path.clone(),
        source,
    })?;

    let names: Vec<&[u8]> = args.files.iter().map(|f| f.as_encoded_bytes()).collect();
    let quiet = args.quiet;

    let stats = reader
        .extract_with_progress(&names, &output_path, |event| {
            if let ExtractProgress::Extracting { name, .. } = event {
                if !quiet {
                    println!("extracting file: {}", name);
                }
            }
        })
        .map_err(|source| Error::Extract { source })?;
    tracing::info!(
        files = stats.files_extracted,
        bytes = stats.bytes_written,
        dest = %output_path.display(),
        "extract complete"
    );

    if !quiet {
        println!(
            "Extracted {} files ({}) to {}",
            stats.files_extracted,
            format_size(stats.bytes_written),
            output_path.display()
        );
    }

    Ok(())
}
