//! Duplicate detection module.
//!
//! This module provides:
//! - Fingerprint groupings with first-encounter ordering ([`groups`])
//! - The scan orchestrator filling the file and directory groupings ([`finder`])

pub mod finder;
pub mod groups;

pub use finder::{
    DuplicateFinder, FinderConfig, FinderError, ScanGroups, ScanSummary, DEFAULT_IO_THREADS,
};
pub use groups::{FingerprintGroup, FingerprintGroups};
