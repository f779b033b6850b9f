//! Process exit codes and structured error reports.

use serde::Serialize;

use crate::duplicates::ScanSummary;

/// Exit codes returned by the `treedupe` binary.
///
/// - 0: scan completed, duplicates found
/// - 1: unexpected failure
/// - 2: scan completed, nothing duplicated
/// - 3: scan completed, but some nodes could not be read
/// - 130: interrupted (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates were found.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates were found.
    NoDuplicates = 2,
    /// The scan finished with per-node errors.
    PartialSuccess = 3,
    /// The scan was interrupted.
    Interrupted = 130,
}

impl ExitCode {
    /// Numeric process exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Machine-readable code used in error messages.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "TD000",
            Self::GeneralError => "TD001",
            Self::NoDuplicates => "TD002",
            Self::PartialSuccess => "TD003",
            Self::Interrupted => "TD130",
        }
    }

    /// Pick the exit code for a finished scan.
    ///
    /// Per-node errors take precedence so that scripts notice an
    /// incomplete result even when duplicates were found.
    #[must_use]
    pub fn from_summary(summary: &ScanSummary) -> Self {
        if summary.has_errors() {
            Self::PartialSuccess
        } else if summary.has_duplicates() {
            Self::Success
        } else {
            Self::NoDuplicates
        }
    }
}

/// Fatal error rendered as JSON for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// Code prefix, e.g. "TD001"
    pub code: String,
    /// Numeric exit code
    pub exit_code: i32,
    /// Error message including its cause chain
    pub message: String,
    /// Whether the run was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Build a report for `err` exiting with `exit_code`.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
