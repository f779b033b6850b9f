//! JSON report for scripting.
//!
//! Fingerprints are always written in full and paths are absolute.
//!
//! ```json
//! {
//!   "root": "/home/me/photos",
//!   "compare_dirs": true,
//!   "file_groups": [
//!     { "hash": "9b71d2...", "size": 5, "paths": ["/home/me/photos/a", "/home/me/photos/b"] }
//!   ],
//!   "directory_groups": [],
//!   "summary": { "total_files": 3, "duplicate_files": 1, "reclaimable_space": 5, ... },
//!   "errors": [ { "path": "/home/me/photos/locked", "message": "Permission denied: ..." } ]
//! }
//! ```
//!
//! `directory_groups` is `null` when directory comparison was off.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{FingerprintGroup, FingerprintGroups, ScanGroups, ScanSummary};
use crate::error::ExitCode;

/// One duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// Full fingerprint as lowercase hex
    pub hash: String,
    /// Content size of one member in bytes
    pub size: u64,
    /// Member paths in walk order
    pub paths: Vec<String>,
}

impl From<&FingerprintGroup> for JsonGroup {
    fn from(group: &FingerprintGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            paths: group
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub total_size: u64,
    pub duplicate_file_groups: usize,
    pub duplicate_files: usize,
    pub reclaimable_space: u64,
    pub total_directories: usize,
    pub duplicate_directory_groups: usize,
    pub duplicate_directories: usize,
    pub skipped_symlinks: usize,
    pub skipped_special: usize,
    pub skipped_unreadable: usize,
    pub scan_duration_ms: u64,
    /// Numeric exit code for this run
    pub exit_code: i32,
    /// Machine-readable exit code name, e.g. "TD000"
    pub exit_code_name: String,
}

impl JsonSummary {
    fn new(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            duplicate_file_groups: summary.duplicate_file_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            total_directories: summary.total_directories,
            duplicate_directory_groups: summary.duplicate_directory_groups,
            duplicate_directories: summary.duplicate_directories,
            skipped_symlinks: summary.skipped_symlinks,
            skipped_special: summary.skipped_special,
            skipped_unreadable: summary.skipped_unreadable,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A per-node error that did not stop the scan.
#[derive(Debug, Clone, Serialize)]
pub struct JsonScanError {
    pub path: String,
    pub message: String,
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub root: String,
    pub compare_dirs: bool,
    pub file_groups: Vec<JsonGroup>,
    pub directory_groups: Option<Vec<JsonGroup>>,
    pub summary: JsonSummary,
    pub errors: Vec<JsonScanError>,
}

fn duplicate_groups(groups: &FingerprintGroups) -> Vec<JsonGroup> {
    groups.duplicates().map(JsonGroup::from).collect()
}

impl JsonReport {
    /// Build the report for one finished scan.
    #[must_use]
    pub fn new(groups: &ScanGroups, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            root: summary.root.to_string_lossy().into_owned(),
            compare_dirs: summary.compare_dirs,
            file_groups: duplicate_groups(&groups.files),
            directory_groups: groups.directories.as_ref().map(duplicate_groups),
            summary: JsonSummary::new(summary, exit_code),
            errors: summary
                .scan_errors
                .iter()
                .map(|e| JsonScanError {
                    path: e.path().to_string_lossy().into_owned(),
                    message: e.to_string(),
                })
                .collect(),
        }
    }

    /// Serialize to a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the pretty-printed report followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur while writing the JSON report.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing JSON report: {0}")]
    Io(#[from] std::io::Error),
}
