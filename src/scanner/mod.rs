//! Scanner module for tree traversal and content fingerprinting.
//!
//! This module provides functionality for:
//! - Single-pass directory walking using walkdir
//! - File fingerprinting with BLAKE3
//! - Directory fingerprinting from the ordered digests of descendant files
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`hasher`]: BLAKE3 digest function and file fingerprinter (streaming / mmap)
//! - [`dirhash`]: Directory fingerprinter with its own name-sorted sub-walk
//! - [`walker`]: Tree walker classifying every visited node
//!
//! # Example
//!
//! ```no_run
//! use treedupe::scanner::{EntryKind, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."));
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(e) if e.kind == EntryKind::File => println!("{}: {} bytes", e.path.display(), e.size),
//!         Ok(_) => {}
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod dirhash;
pub mod hasher;
pub mod walker;

use std::path::PathBuf;

pub use dirhash::{DirDigest, DirectoryFingerprinter};
pub use hasher::{digest, empty_digest, FileDigest, Hasher, MMAP_THRESHOLD};
pub use walker::{WalkEntry, Walker};

/// A content fingerprint: 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Render a fingerprint as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    use std::fmt::Write;

    hash.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Parse a 64-character hexadecimal string back into a fingerprint.
///
/// Returns `None` if the string has the wrong length or contains
/// non-hex characters.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    if hex.len() != 64 || !hex.is_ascii() {
        return None;
    }

    let mut hash = [0u8; 32];
    for (i, byte) in hash.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(hash)
}

/// Abbreviated rendering of a fingerprint for terminal display.
///
/// Keeps the first and last six hex characters. The full value remains
/// available through [`hash_to_hex`].
#[must_use]
pub fn abbreviate_hash(hash: &Hash) -> String {
    let hex = hash_to_hex(hash);
    format!("{}...{}", &hex[..6], &hex[hex.len() - 6..])
}

/// Kind of a node visited during a walk.
///
/// Determined without following symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory (not a symlink to one)
    Directory,
    /// Symbolic link, whatever it points to
    Symlink,
    /// Device, socket, FIFO or anything else without a flat byte stream
    Other,
}

impl EntryKind {
    /// Classify a `std::fs::FileType` obtained without following links.
    #[must_use]
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// What to do with a file whose contents cannot be fully read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadErrorPolicy {
    /// Leave the file out of every grouping and count it as skipped.
    #[default]
    Skip,
    /// Group the file under the digest of whatever bytes were read.
    BestEffort,
}

/// Errors that can occur during tree traversal.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a node.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be fingerprinted.
    #[error(transparent)]
    HashError(#[from] HashError),
}

impl ScanError {
    /// Build a scan error from an I/O error, picking the most specific variant.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    /// Convert a walkdir error, falling back to `fallback` when it carries no path.
    #[must_use]
    pub fn from_walkdir(err: walkdir::Error, fallback: &std::path::Path) -> Self {
        let path = err
            .path()
            .map_or_else(|| fallback.to_path_buf(), std::path::Path::to_path_buf);
        Self::from_io(path, err.into())
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) => p,
            Self::Io { path, .. } => path,
            Self::HashError(e) => e.path(),
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Build a hash error from an I/O error, picking the most specific variant.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
