use serde::Serialize;
use sludge_format::{Entry, SludgeReader};

use crate::cli::ListArgs;
use crate::error::{Error, Result};
use crate::util::format_entry;

#[derive(Serialize)]
struct JsonEntry {
    name: String,
    size: u64,
    offset: u64,
}

impl From<&Entry> for JsonEntry {
    fn from(entry: &Entry) -> JsonEntry {
        JsonEntry {
            name: entry.name().to_string(),
            size: entry.size(),
            offset: entry.offset,
        }
    }
}

pub fn run(args: ListArgs) -> Result<()> {
    let mut reader = SludgeReader::open(&args.archive).map_err(|source| Error::OpenArchive {
        path: args.archive.clone(),
        source,
    })?;

    let read_error = |source| Error::ReadArchive {
        path: args.archive.clone(),
        source,
    };

    if args.json {
        let mut entries = Vec::new();
        for entry in reader.records() {
            entries.push(JsonEntry::from(&entry.map_err(read_error)?));
        }

        let json =
            serde_json::to_string_pretty(&entries).map_err(|source| Error::Serialize { source })?;
        println!("{}", json);
        Ok(())
    } else {
        // Print as we go so a corrupt tail still shows every readable record.
        for entry in reader.records() {
            let entry = entry.map_err(read_error)?;
            println!("{}", format_entry(entry.size(), &entry.name().to_string_lossy()));
        }
        Ok(())
    }
}
