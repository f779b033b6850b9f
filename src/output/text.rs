//! Human-readable text report.
//!
//! ```text
//! Duplicated Directories in /home/me/photos
//! 	3f2a9c...b81e07:
//! 		 -> 2023/trip
//! 		 -> backup/trip
//!
//! Duplicated Files in /home/me/photos
//! 	9b71d2...44c1aa:
//! 		 -> a.jpg
//! 		 -> copy of a.jpg
//!
//! Runtime: 	12.40ms
//! Scanned:	4 directories	9 files
//! Duplicates:	1 directories	1 files
//! Duplicate Size: 2.1 MiB
//! ```
//!
//! Only groups with two or more members are listed. Paths are shown
//! relative to the scan root; the root itself shows as `.`.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;

use yansi::{Condition, Paint};

use crate::duplicates::{FingerprintGroups, ScanGroups, ScanSummary};

/// Renders a scan as text.
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a> {
    groups: &'a ScanGroups,
    summary: &'a ScanSummary,
    full_fingerprints: bool,
    color: bool,
}

impl<'a> TextReport<'a> {
    /// Create a report with abbreviated fingerprints and no color.
    #[must_use]
    pub fn new(groups: &'a ScanGroups, summary: &'a ScanSummary) -> Self {
        Self {
            groups,
            summary,
            full_fingerprints: false,
            color: false,
        }
    }

    /// Print full 64-character fingerprints.
    #[must_use]
    pub fn with_full_fingerprints(mut self, full: bool) -> Self {
        self.full_fingerprints = full;
        self
    }

    /// Style headings and fingerprints with ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn condition(&self) -> Condition {
        if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        }
    }

    /// Write the whole report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let root = self.summary.root.display().to_string();

        if let Some(dirs) = &self.groups.directories {
            let heading = format!("Duplicated Directories in {root}");
            writeln!(out, "\n{}", heading.bold().whenever(self.condition()))?;
            self.write_groups(out, dirs)?;
        }

        let heading = format!("Duplicated Files in {root}");
        writeln!(out, "\n{}", heading.bold().whenever(self.condition()))?;
        self.write_groups(out, &self.groups.files)?;

        self.write_stats(out)
    }

    fn write_groups<W: Write>(&self, out: &mut W, groups: &FingerprintGroups) -> io::Result<()> {
        for group in groups.duplicates() {
            let label = if self.full_fingerprints {
                group.hash_hex()
            } else {
                group.hash_short()
            };
            writeln!(out, "\t{}:", label.cyan().whenever(self.condition()))?;
            for path in &group.paths {
                writeln!(out, "\t\t -> {}", relative_to(path, &self.summary.root))?;
            }
        }
        Ok(())
    }

    fn write_stats<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let s = self.summary;
        writeln!(out)?;
        writeln!(out, "Runtime: \t{:.2?}", s.scan_duration)?;
        if s.compare_dirs {
            writeln!(
                out,
                "Scanned:\t{} directories\t{} files",
                s.total_directories, s.total_files
            )?;
            writeln!(
                out,
                "Duplicates:\t{} directories\t{} files",
                s.duplicate_directories, s.duplicate_files
            )?;
        } else {
            writeln!(out, "Scanned:\t{} files", s.total_files)?;
            writeln!(out, "Duplicates:\t{} files", s.duplicate_files)?;
        }
        writeln!(out, "Duplicate Size: {}", s.reclaimable_display())?;

        let skipped = s.skipped_symlinks + s.skipped_special + s.skipped_unreadable;
        if skipped > 0 {
            writeln!(
                out,
                "Skipped:\t{} symlinks\t{} special\t{} unreadable",
                s.skipped_symlinks, s.skipped_special, s.skipped_unreadable
            )?;
        }
        if s.has_errors() {
            let line = format!("Errors:\t\t{} (see log)", s.scan_errors.len());
            writeln!(out, "{}", line.yellow().whenever(self.condition()))?;
        }
        writeln!(out)
    }
}

/// Display `path` relative to `root`, or unchanged when it lies outside.
fn relative_to<'p>(path: &'p Path, root: &Path) -> Cow<'p, str> {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => Cow::Borrowed("."),
        Ok(rel) => rel.to_string_lossy(),
        Err(_) => path.to_string_lossy(),
    }
}
