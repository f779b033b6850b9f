//! Duplicate finder orchestrating one scan.
//!
//! # Overview
//!
//! A scan runs in three steps:
//! 1. **Walk** - one traversal of the root, classifying every node
//! 2. **Hash files** - fingerprint each regular file and group by digest
//! 3. **Hash directories** - only with directory comparison enabled, run the
//!    [`DirectoryFingerprinter`] on every non-symlink directory (root included)
//!
//! Hashing is spread over a bounded rayon pool. Results are inserted into
//! the groupings in walk order afterwards, so group membership order does
//! not depend on thread scheduling.
//!
//! Per-node failures never abort the scan. They are logged, kept in
//! [`ScanSummary::scan_errors`], and the scan moves on. A missing root
//! produces empty groupings rather than an error. A root that is itself a
//! symlink is never followed and also yields empty groupings.
//!
//! # Example
//!
//! ```no_run
//! use treedupe::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_compare_dirs(true));
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! for group in groups.files.duplicates() {
//!     println!("{}: {:?}", group.hash_short(), group.paths);
//! }
//! println!("Reclaimable: {}", summary.reclaimable_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::FingerprintGroups;
use crate::progress::{ProgressCallback, ScanPhase};
use crate::scanner::{
    DirectoryFingerprinter, EntryKind, FileDigest, Hasher, ReadErrorPolicy, ScanError, WalkEntry,
    Walker,
};

/// Default number of hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Configuration for a scan.
#[derive(Clone)]
pub struct FinderConfig {
    /// Also fingerprint and group directories
    pub compare_dirs: bool,
    /// Number of threads used for hashing
    pub io_threads: usize,
    /// Handling of files that cannot be fully read
    pub read_error_policy: ReadErrorPolicy,
    /// File fingerprinter settings
    pub hasher: Hasher,
    /// Shutdown flag for graceful termination
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Progress observer
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("compare_dirs", &self.compare_dirs)
            .field("io_threads", &self.io_threads)
            .field("read_error_policy", &self.read_error_policy)
            .field("hasher", &self.hasher)
            .field("shutdown_flag", &self.shutdown_flag.is_some())
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            compare_dirs: false,
            io_threads: DEFAULT_IO_THREADS,
            read_error_policy: ReadErrorPolicy::default(),
            hasher: Hasher::new(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Enable or disable directory comparison.
    #[must_use]
    pub fn with_compare_dirs(mut self, enabled: bool) -> Self {
        self.compare_dirs = enabled;
        self
    }

    /// Set the number of hashing threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the read-error policy.
    #[must_use]
    pub fn with_read_error_policy(mut self, policy: ReadErrorPolicy) -> Self {
        self.read_error_policy = policy;
        self
    }

    /// Replace the file fingerprinter settings.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress observer.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// The two fingerprint groupings produced by a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanGroups {
    /// Regular files keyed by content fingerprint
    pub files: FingerprintGroups,
    /// Directories keyed by directory fingerprint; `None` unless comparison was enabled
    pub directories: Option<FingerprintGroups>,
}

impl ScanGroups {
    fn new(compare_dirs: bool) -> Self {
        Self {
            files: FingerprintGroups::new(),
            directories: compare_dirs.then(FingerprintGroups::new),
        }
    }
}

/// Summary statistics from a scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Absolute root that was scanned
    pub root: PathBuf,
    /// Whether directories were compared
    pub compare_dirs: bool,
    /// Regular files placed into the file grouping
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// File groups with 2+ members
    pub duplicate_file_groups: usize,
    /// Redundant file copies (members minus one per group)
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one file of each group
    pub reclaimable_space: u64,
    /// Directories placed into the directory grouping
    pub total_directories: usize,
    /// Directory groups with 2+ members
    pub duplicate_directory_groups: usize,
    /// Redundant directory copies
    pub duplicate_directories: usize,
    /// Symlinks seen and left out
    pub skipped_symlinks: usize,
    /// Devices, sockets, FIFOs seen and left out
    pub skipped_special: usize,
    /// Files left out because they could not be read
    pub skipped_unreadable: usize,
    /// Wall-clock duration of the scan
    pub scan_duration: Duration,
    /// Errors encountered during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Whether any file or directory duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.duplicate_files > 0 || self.duplicate_directories > 0
    }

    /// Whether any per-node error occurred.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }

    /// Reclaimable space as human-readable IEC string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Total size as human-readable IEC string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }

    fn fill_from(&mut self, groups: &ScanGroups) {
        self.total_files = groups.files.total_members();
        self.duplicate_file_groups = groups.files.duplicates().count();
        self.duplicate_files = groups.files.duplicate_members();
        self.reclaimable_space = groups.files.reclaimable_space();

        if let Some(dirs) = &groups.directories {
            self.total_directories = dirs.total_members();
            self.duplicate_directory_groups = dirs.duplicates().count();
            self.duplicate_directories = dirs.duplicate_members();
        }
    }
}

/// Errors that can abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The hashing thread pool could not be created.
    #[error("Failed to build hashing thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Duplicate finder driving the walk and both fingerprinters.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Arc::new(config.hasher.clone());
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    fn is_shutdown_requested(&self) -> bool {
        self.config
            .shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn progress(&self) -> Option<&dyn ProgressCallback> {
        self.config.progress_callback.as_deref()
    }

    /// Scan `path` and group files (and directories) by fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if the shutdown flag is raised
    /// mid-scan, or [`FinderError::ThreadPool`] if the hashing pool cannot
    /// be created. Per-node I/O failures are not errors; see
    /// [`ScanSummary::scan_errors`].
    pub fn find_duplicates(&self, path: &Path) -> Result<(ScanGroups, ScanSummary), FinderError> {
        let start = Instant::now();
        let root = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        let mut groups = ScanGroups::new(self.config.compare_dirs);
        let mut summary = ScanSummary {
            root: root.clone(),
            compare_dirs: self.config.compare_dirs,
            ..Default::default()
        };

        match std::fs::symlink_metadata(&root) {
            Err(e) => {
                let err = ScanError::from_io(root.clone(), e);
                log::error!("Cannot scan {}: {}", root.display(), err);
                summary.scan_errors.push(err);
                summary.scan_duration = start.elapsed();
                return Ok((groups, summary));
            }
            Ok(meta) if meta.file_type().is_symlink() => {
                log::warn!("Root {} is a symlink; nothing to scan", root.display());
                summary.skipped_symlinks = 1;
                summary.scan_duration = start.elapsed();
                return Ok((groups, summary));
            }
            Ok(_) => {}
        }

        log::info!(
            "Scanning {} (directory comparison {})",
            root.display(),
            if self.config.compare_dirs { "on" } else { "off" }
        );

        let (files, dirs) = self.walk(&root, &mut summary)?;
        log::debug!(
            "Walk found {} file(s) and {} dir(s) to fingerprint",
            files.len(),
            dirs.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()?;

        self.hash_files(&pool, files, &mut groups.files, &mut summary)?;

        if let Some(dir_groups) = groups.directories.as_mut() {
            self.hash_directories(&pool, dirs, dir_groups)?;
        }

        summary.fill_from(&groups);
        summary.scan_duration = start.elapsed();

        log::info!(
            "Scan complete: {} files ({} duplicates), {} directories ({} duplicates), {} reclaimable in {:.2?}",
            summary.total_files,
            summary.duplicate_files,
            summary.total_directories,
            summary.duplicate_directories,
            summary.reclaimable_display(),
            summary.scan_duration
        );

        Ok((groups, summary))
    }

    /// Single traversal: split nodes into files and directories to fingerprint.
    fn walk(
        &self,
        root: &Path,
        summary: &mut ScanSummary,
    ) -> Result<(Vec<WalkEntry>, Vec<WalkEntry>), FinderError> {
        let mut walker = Walker::new(root);
        if let Some(flag) = &self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        if let Some(cb) = self.progress() {
            cb.on_phase_start(ScanPhase::Walking, 0);
        }

        let mut files = Vec::new();
        let mut dirs = Vec::new();

        for (visited, result) in walker.walk().enumerate() {
            let entry = match result {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("{}", e);
                    summary.scan_errors.push(e);
                    continue;
                }
            };

            if let Some(cb) = self.progress() {
                cb.on_progress(visited + 1, &entry.path.to_string_lossy());
            }

            match entry.kind {
                EntryKind::File => files.push(entry),
                EntryKind::Directory => {
                    if self.config.compare_dirs {
                        dirs.push(entry);
                    }
                }
                EntryKind::Symlink => {
                    log::trace!("Skipping symlink: {}", entry.path.display());
                    summary.skipped_symlinks += 1;
                }
                EntryKind::Other => {
                    log::trace!("Skipping special file: {}", entry.path.display());
                    summary.skipped_special += 1;
                }
            }
        }

        if let Some(cb) = self.progress() {
            cb.on_phase_end(ScanPhase::Walking);
        }

        if self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        Ok((files, dirs))
    }

    fn hash_files(
        &self,
        pool: &rayon::ThreadPool,
        files: Vec<WalkEntry>,
        groups: &mut FingerprintGroups,
        summary: &mut ScanSummary,
    ) -> Result<(), FinderError> {
        if let Some(cb) = self.progress() {
            cb.on_phase_start(ScanPhase::HashingFiles, files.len());
        }

        let done = AtomicUsize::new(0);
        let digests: Vec<Option<FileDigest>> = pool.install(|| {
            files
                .par_iter()
                .map(|entry| {
                    if self.is_shutdown_requested() {
                        return None;
                    }
                    let digest = self.hasher.hash_file(&entry.path);
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(cb) = self.progress() {
                        cb.on_progress(n, &entry.path.to_string_lossy());
                    }
                    Some(digest)
                })
                .collect()
        });

        if let Some(cb) = self.progress() {
            cb.on_phase_end(ScanPhase::HashingFiles);
        }

        if self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        for (entry, digest) in files.into_iter().zip(digests) {
            let Some(digest) = digest else { continue };
            match digest {
                FileDigest::Complete { hash, bytes_read } => {
                    summary.total_size += bytes_read;
                    groups.insert(hash, entry.path, bytes_read);
                }
                FileDigest::Partial {
                    hash,
                    bytes_read,
                    error,
                } => {
                    log::warn!("{}", error);
                    summary.scan_errors.push(error.into());
                    match self.config.read_error_policy {
                        // Sized by the bytes behind the digest, not the stat size.
                        ReadErrorPolicy::BestEffort => {
                            summary.total_size += bytes_read;
                            groups.insert(hash, entry.path, bytes_read);
                        }
                        ReadErrorPolicy::Skip => {
                            log::debug!("Leaving unreadable file out: {}", entry.path.display());
                            summary.skipped_unreadable += 1;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn hash_directories(
        &self,
        pool: &rayon::ThreadPool,
        dirs: Vec<WalkEntry>,
        groups: &mut FingerprintGroups,
    ) -> Result<(), FinderError> {
        if let Some(cb) = self.progress() {
            cb.on_phase_start(ScanPhase::HashingDirectories, dirs.len());
        }

        let mut fingerprinter = DirectoryFingerprinter::new(
            Arc::clone(&self.hasher),
            self.config.read_error_policy,
        );
        if let Some(flag) = &self.config.shutdown_flag {
            fingerprinter = fingerprinter.with_shutdown_flag(Arc::clone(flag));
        }

        let done = AtomicUsize::new(0);
        let digests: Vec<_> = pool.install(|| {
            dirs.par_iter()
                .map(|entry| {
                    let digest = fingerprinter.fingerprint(&entry.path);
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(cb) = self.progress() {
                        cb.on_progress(n, &entry.path.to_string_lossy());
                    }
                    digest
                })
                .collect()
        });

        if let Some(cb) = self.progress() {
            cb.on_phase_end(ScanPhase::HashingDirectories);
        }

        if self.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        for (entry, digest) in dirs.into_iter().zip(digests) {
            if !digest.errors.is_empty() {
                log::debug!(
                    "{} error(s) while fingerprinting directory {}",
                    digest.errors.len(),
                    entry.path.display()
                );
            }
            groups.insert(digest.hash, entry.path, digest.bytes);
        }

        Ok(())
    }
}
