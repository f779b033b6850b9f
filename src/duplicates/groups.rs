//! Fingerprint groupings.
//!
//! # Overview
//!
//! A [`FingerprintGroups`] maps each fingerprint to the ordered list of
//! paths that produced it. Members are appended in the order they are
//! inserted and never removed or re-keyed. Groups themselves are kept in
//! first-encounter order so reports come out the same way on every run.
//!
//! Any group holding two or more paths is a duplicate set. Because
//! membership is keyed on a single fingerprint value, duplication is
//! symmetric and transitive without any pairwise comparison.
//!
//! # Example
//!
//! ```
//! use treedupe::duplicates::FingerprintGroups;
//! use treedupe::scanner::digest;
//! use std::path::PathBuf;
//!
//! let mut groups = FingerprintGroups::new();
//! groups.insert(digest(b"hello"), PathBuf::from("/a.txt"), 5);
//! groups.insert(digest(b"hello"), PathBuf::from("/b.txt"), 5);
//! groups.insert(digest(b"world"), PathBuf::from("/c.txt"), 5);
//!
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups.duplicates().count(), 1);
//! assert_eq!(groups.duplicate_members(), 1);
//! assert_eq!(groups.reclaimable_space(), 5);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{abbreviate_hash, hash_to_hex, Hash};

/// All paths that share one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintGroup {
    /// The shared fingerprint
    pub hash: Hash,
    /// Content size of the first member in bytes
    ///
    /// For files this is the file size; for directories the summed size
    /// of the files that went into the fingerprint.
    pub size: u64,
    /// Member paths in insertion order
    pub paths: Vec<PathBuf>,
}

impl FingerprintGroup {
    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether this group is a duplicate set (2+ members).
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.paths.len() > 1
    }

    /// Number of redundant copies (members minus one kept original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Space taken by the redundant copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Fingerprint as full hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Fingerprint in abbreviated display form.
    #[must_use]
    pub fn hash_short(&self) -> String {
        abbreviate_hash(&self.hash)
    }
}

/// Append-only map from fingerprint to member paths.
#[derive(Debug, Clone, Default)]
pub struct FingerprintGroups {
    index: HashMap<Hash, usize>,
    groups: Vec<FingerprintGroup>,
}

impl FingerprintGroups {
    /// Create an empty grouping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the group keyed by `hash`, creating it if needed.
    ///
    /// `size` is recorded only when the group is created.
    pub fn insert(&mut self, hash: Hash, path: PathBuf, size: u64) {
        match self.index.get(&hash) {
            Some(&i) => self.groups[i].paths.push(path),
            None => {
                self.index.insert(hash, self.groups.len());
                self.groups.push(FingerprintGroup {
                    hash,
                    size,
                    paths: vec![path],
                });
            }
        }
    }

    /// Group for a fingerprint, if any path produced it.
    #[must_use]
    pub fn get(&self, hash: &Hash) -> Option<&FingerprintGroup> {
        self.index.get(hash).map(|&i| &self.groups[i])
    }

    /// All groups, in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &FingerprintGroup> {
        self.groups.iter()
    }

    /// Groups with two or more members, in first-encounter order.
    pub fn duplicates(&self) -> impl Iterator<Item = &FingerprintGroup> {
        self.groups.iter().filter(|g| g.is_duplicate())
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of paths across all groups.
    #[must_use]
    pub fn total_members(&self) -> usize {
        self.groups.iter().map(FingerprintGroup::len).sum()
    }

    /// Number of redundant copies across all duplicate groups.
    #[must_use]
    pub fn duplicate_members(&self) -> usize {
        self.groups.iter().map(FingerprintGroup::duplicate_count).sum()
    }

    /// Bytes reclaimable by keeping one member of each duplicate group.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.groups.iter().map(FingerprintGroup::wasted_space).sum()
    }
}
