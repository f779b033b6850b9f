//! Command-line interface definitions for treedupe.
//!
//! Arguments are declared with the clap derive API. Every option that also
//! exists in the configuration file is optional here so that an absent flag
//! leaves the configured value alone.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory
//! treedupe
//!
//! # Compare directories as well as files
//! treedupe ~/Photos --dir-comparison
//!
//! # JSON output for scripting
//! treedupe ~/Downloads --output json
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scanner::ReadErrorPolicy;

/// Find duplicate files and directories by content fingerprint.
///
/// Every regular file under PATH is fingerprinted with BLAKE3. With
/// --dir-comparison each directory also gets a fingerprint derived from the
/// ordered fingerprints of the files below it. Symlinks are never followed.
#[derive(Debug, Parser)]
#[command(name = "treedupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (defaults to the current working directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Also compare directories (re-reads nested files; slow on large trees)
    #[arg(short = 'd', long = "dir-comparison")]
    pub dir_comparison: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Number of threads used for hashing
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// What to do with files that cannot be fully read
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_read_error: Option<OnReadError>,

    /// Show full fingerprints in the text report instead of abbreviations
    #[arg(long)]
    pub full_fingerprints: bool,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Read-error policy as spelled on the command line and in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnReadError {
    /// Leave unreadable files out of the results
    #[default]
    Skip,
    /// Group unreadable files by the bytes that could be read
    BestEffort,
}

impl From<OnReadError> for ReadErrorPolicy {
    fn from(value: OnReadError) -> Self {
        match value {
            OnReadError::Skip => ReadErrorPolicy::Skip,
            OnReadError::BestEffort => ReadErrorPolicy::BestEffort,
        }
    }
}
