use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "sludge",
    about = "Create, append to and extract sludge archives.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(visible_alias = "l", about = "List records in an archive")]
    List(ListArgs),

    #[command(
        visible_alias = "a",
        about = "Append files to an archive, creating it if needed"
    )]
    Add(AddArgs),

    #[command(visible_aliases = ["e", "x"], about = "Extract files from an archive")]
    Extract(ExtractArgs),
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Path to the .sludge archive
    pub archive: PathBuf,

    /// Output in JSON format
    #[arg(short = 'j', long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct AddArgs {
    /// Path to the .sludge archive (created if it does not exist)
    pub archive: PathBuf,

    /// Suppress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Files to append, stored under their base names
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct ExtractArgs {
    /// Path to the .sludge archive to extract
    pub archive: PathBuf,

    /// Output directory (defaults to current directory)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Names of records to extract (extracts all if none specified)
    #[arg(value_name = "NAME")]
    pub files: Vec<OsString>,
}
