//! Tree walker built on walkdir.
//!
//! # Overview
//!
//! [`Walker`] performs one traversal of a root path and yields every node
//! it meets, the root included, classified by [`EntryKind`]. Links are
//! never followed, so a symlinked directory is reported once as a
//! [`EntryKind::Symlink`] and not descended into. Siblings are visited in
//! file-name order to keep results stable between runs.
//!
//! The walker only classifies. Deciding what gets fingerprinted is the job
//! of [`DuplicateFinder`](crate::duplicates::DuplicateFinder).
//!
//! # Example
//!
//! ```no_run
//! use treedupe::scanner::{EntryKind, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"));
//! let files = walker
//!     .walk()
//!     .filter_map(Result::ok)
//!     .filter(|e| e.kind == EntryKind::File)
//!     .count();
//! println!("{files} regular files");
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{EntryKind, ScanError};

/// A node visited by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path of the node (absolute when the root is absolute)
    pub path: PathBuf,
    /// Kind of the node, determined without following links
    pub kind: EntryKind,
    /// Size in bytes for regular files, 0 otherwise
    pub size: u64,
    /// Depth below the root (root is 0)
    pub depth: usize,
}

/// Single-pass directory walker.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            root: path.to_path_buf(),
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// Once the flag reads `true` the iterator ends.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root path being walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the tree, yielding every visited node.
    ///
    /// Errors (unreadable directories, failed stats) are yielded as
    /// [`ScanError`] values and iteration carries on with the next node.
    pub fn walk(&self) -> impl Iterator<Item = Result<WalkEntry, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .map(move |entry| {
                let entry = entry.map_err(|e| ScanError::from_walkdir(e, &self.root))?;
                let kind = EntryKind::from_file_type(entry.file_type());

                let size = if kind == EntryKind::File {
                    entry
                        .metadata()
                        .map_err(|e| ScanError::from_walkdir(e, entry.path()))?
                        .len()
                } else {
                    0
                };

                let depth = entry.depth();
                Ok(WalkEntry {
                    path: entry.into_path(),
                    kind,
                    size,
                    depth,
                })
            })
    }
}
