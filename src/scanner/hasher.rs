//! BLAKE3 digest function and file fingerprinter.
//!
//! # Overview
//!
//! [`digest`] maps a byte slice to a 32-byte [`Hash`]. [`Hasher`] applies it
//! to a file's full contents, either by streaming fixed-size chunks or, for
//! large files, through a memory map hashed on the rayon pool.
//!
//! Reading never aborts a scan. When a read fails part-way, the outcome is
//! a [`FileDigest::Partial`] carrying the digest of the bytes obtained so
//! far together with the error; callers decide what to do with it.
//!
//! # Example
//!
//! ```no_run
//! use treedupe::scanner::{FileDigest, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! match hasher.hash_file(Path::new("notes.txt")) {
//!     FileDigest::Complete { hash, .. } => println!("{:02x?}", &hash[..4]),
//!     FileDigest::Partial { error, .. } => eprintln!("read failed: {error}"),
//! }
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use memmap2::Mmap;

use super::{Hash, HashError};

/// Read buffer size for streaming hashing (64 KiB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Default size at which files are memory-mapped instead of streamed (16 MiB).
pub const MMAP_THRESHOLD: u64 = 16 * 1024 * 1024;

/// Digest a byte sequence.
#[must_use]
pub fn digest(bytes: &[u8]) -> Hash {
    *blake3::hash(bytes).as_bytes()
}

/// Digest of the empty byte sequence.
#[must_use]
pub fn empty_digest() -> Hash {
    digest(&[])
}

/// Result of fingerprinting one file.
#[derive(Debug)]
pub enum FileDigest {
    /// Every byte of the file was read.
    Complete {
        /// Digest of the full contents
        hash: Hash,
        /// Number of bytes hashed
        bytes_read: u64,
    },
    /// Reading stopped early; `hash` covers only the first `bytes_read` bytes.
    Partial {
        /// Digest of the bytes obtained before the failure
        hash: Hash,
        /// Number of bytes hashed
        bytes_read: u64,
        /// Why reading stopped
        error: HashError,
    },
}

impl FileDigest {
    /// The digest, complete or not.
    #[must_use]
    pub fn hash(&self) -> Hash {
        match self {
            Self::Complete { hash, .. } | Self::Partial { hash, .. } => *hash,
        }
    }

    /// Number of bytes that went into the digest.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        match self {
            Self::Complete { bytes_read, .. } | Self::Partial { bytes_read, .. } => *bytes_read,
        }
    }

    /// Whether the whole file was read.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Convert into a `Result`, discarding partial digests.
    ///
    /// # Errors
    ///
    /// Returns the read error of a partial digest.
    pub fn into_result(self) -> Result<Hash, HashError> {
        match self {
            Self::Complete { hash, .. } => Ok(hash),
            Self::Partial { error, .. } => Err(error),
        }
    }
}

/// File fingerprinter.
///
/// Cheap to share behind an `Arc`; holds no per-file state.
#[derive(Debug, Clone)]
pub struct Hasher {
    use_mmap: bool,
    mmap_threshold: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with memory mapping enabled above [`MMAP_THRESHOLD`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            use_mmap: true,
            mmap_threshold: MMAP_THRESHOLD,
        }
    }

    /// Enable or disable memory-mapped hashing.
    #[must_use]
    pub fn with_mmap(mut self, enabled: bool) -> Self {
        self.use_mmap = enabled;
        self
    }

    /// Set the file size at which memory mapping kicks in.
    #[must_use]
    pub fn with_mmap_threshold(mut self, bytes: u64) -> Self {
        self.mmap_threshold = bytes;
        self
    }

    /// Fingerprint a regular file.
    ///
    /// Never fails outright: an open failure yields the empty digest with
    /// zero bytes read, a mid-read failure yields the digest of the prefix.
    pub fn hash_file(&self, path: &Path) -> FileDigest {
        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                return FileDigest::Partial {
                    hash: empty_digest(),
                    bytes_read: 0,
                    error: HashError::from_io(path.to_path_buf(), e),
                };
            }
        };

        if self.use_mmap {
            let len = file.metadata().map(|m| m.len()).unwrap_or(0);
            if len > 0 && len >= self.mmap_threshold {
                // SAFETY: the map is read-only and dropped before returning.
                // Concurrent truncation by another process can still fault;
                // that is the documented trade-off of memmap2.
                match unsafe { Mmap::map(&file) } {
                    Ok(map) => {
                        let mut state = blake3::Hasher::new();
                        state.update_rayon(&map);
                        return FileDigest::Complete {
                            hash: *state.finalize().as_bytes(),
                            bytes_read: map.len() as u64,
                        };
                    }
                    Err(e) => {
                        log::debug!(
                            "mmap failed for {}, streaming instead: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
        }

        Self::hash_stream(path, &mut file)
    }

    /// Fingerprint a file, treating any read failure as an error.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or fully read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        self.hash_file(path).into_result()
    }

    fn hash_stream(path: &Path, reader: &mut impl Read) -> FileDigest {
        let mut state = blake3::Hasher::new();
        let mut buf = vec![0u8; BUFFER_SIZE];
        let mut bytes_read = 0u64;

        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    state.update(&buf[..n]);
                    bytes_read += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return FileDigest::Partial {
                        hash: *state.finalize().as_bytes(),
                        bytes_read,
                        error: HashError::from_io(path.to_path_buf(), e),
                    };
                }
            }
        }

        FileDigest::Complete {
            hash: *state.finalize().as_bytes(),
            bytes_read,
        }
    }
}
