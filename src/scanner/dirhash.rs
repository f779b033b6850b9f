//! Directory fingerprinting.
//!
//! A directory's fingerprint is the digest of the concatenated raw digests
//! of its regular-file descendants, taken in a fixed depth-first order with
//! siblings sorted by file name. File names, sizes, empty subdirectories
//! and symlinks do not enter the computation, so two trees holding the same
//! file contents in the same relative order fingerprint equally even when
//! their names differ.
//!
//! The sub-walk here is independent of the outer [`Walker`](super::Walker)
//! pass and is repeated for every directory that gets fingerprinted. A file
//! N levels deep is therefore read once per enclosing directory, which is
//! why directory comparison is opt-in.
//!
//! Errors met in the sub-walk are logged at debug level and returned in
//! [`DirDigest::errors`]; the outer pass already reports each of them once.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::hasher::{digest, FileDigest, Hasher};
use super::{EntryKind, Hash, ReadErrorPolicy, ScanError};

/// Result of fingerprinting one directory.
#[derive(Debug)]
pub struct DirDigest {
    /// Digest of the concatenated file digests
    pub hash: Hash,
    /// Number of files whose digests went into the buffer
    pub files: usize,
    /// Total bytes hashed across those files
    pub bytes: u64,
    /// Errors hit during the sub-walk
    pub errors: Vec<ScanError>,
}

/// Computes directory fingerprints.
#[derive(Debug, Clone)]
pub struct DirectoryFingerprinter {
    hasher: Arc<Hasher>,
    policy: ReadErrorPolicy,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl DirectoryFingerprinter {
    /// Create a fingerprinter sharing `hasher`.
    #[must_use]
    pub fn new(hasher: Arc<Hasher>, policy: ReadErrorPolicy) -> Self {
        Self {
            hasher,
            policy,
            shutdown_flag: None,
        }
    }

    /// Stop the sub-walk early once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Fingerprint the subtree rooted at `dir`.
    ///
    /// A directory with no readable regular files below it yields the
    /// digest of the empty buffer.
    pub fn fingerprint(&self, dir: &Path) -> DirDigest {
        let mut buffer: Vec<u8> = Vec::new();
        let mut files = 0usize;
        let mut bytes = 0u64;
        let mut errors = Vec::new();

        let walk = WalkDir::new(dir)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();

        for entry in walk {
            if self.is_shutdown_requested() {
                log::debug!("Directory hashing interrupted at {}", dir.display());
                break;
            }

            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let err = ScanError::from_walkdir(e, dir);
                    log::debug!("{}", err);
                    errors.push(err);
                    continue;
                }
            };

            if EntryKind::from_file_type(entry.file_type()) != EntryKind::File {
                continue;
            }

            let file_digest = self.hasher.hash_file(entry.path());
            let counted = match file_digest {
                FileDigest::Complete { hash, bytes_read } => Some((hash, bytes_read)),
                FileDigest::Partial {
                    hash,
                    bytes_read,
                    error,
                } => {
                    log::debug!("{}", error);
                    errors.push(error.into());
                    match self.policy {
                        ReadErrorPolicy::BestEffort => Some((hash, bytes_read)),
                        ReadErrorPolicy::Skip => None,
                    }
                }
            };

            if let Some((hash, bytes_read)) = counted {
                buffer.extend_from_slice(&hash);
                files += 1;
                bytes += bytes_read;
            }
        }

        log::trace!(
            "Directory {} fingerprinted from {} file(s)",
            dir.display(),
            files
        );

        DirDigest {
            hash: digest(&buffer),
            files,
            bytes,
            errors,
        }
    }
}
