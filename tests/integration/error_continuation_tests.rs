//! Scans keep going past unreadable nodes.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use treedupe::duplicates::{DuplicateFinder, FinderConfig};
use treedupe::scanner::{digest, empty_digest, ReadErrorPolicy, ScanError};

#[test]
fn test_missing_root_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");

    let finder = DuplicateFinder::new(FinderConfig::default().with_compare_dirs(true));
    let (groups, summary) = finder.find_duplicates(&missing).unwrap();

    assert!(groups.files.is_empty());
    assert!(groups.directories.unwrap().is_empty());
    assert_eq!(summary.scan_errors.len(), 1);
    assert!(matches!(&summary.scan_errors[0], ScanError::NotFound(p) if p == &missing));
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn chmod(path: &Path, mode: u32) {
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    /// Mode bits do not stop a privileged user; those runs skip the test.
    fn bypasses_permissions(path: &Path) -> bool {
        if path.is_dir() {
            fs::read_dir(path).is_ok()
        } else {
            fs::read(path).is_ok()
        }
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "dup").unwrap();
        fs::write(dir.path().join("b.txt"), "dup").unwrap();
        fs::write(dir.path().join("empty"), "").unwrap();
        fs::write(dir.path().join("locked.txt"), "secret").unwrap();
        chmod(&dir.path().join("locked.txt"), 0o000);
        dir
    }

    #[test]
    fn test_unreadable_file_is_skipped_by_default() {
        let dir = fixture();
        let locked = dir.path().join("locked.txt");
        if bypasses_permissions(&locked) {
            return;
        }

        let (groups, summary) = DuplicateFinder::with_defaults()
            .find_duplicates(dir.path())
            .unwrap();

        assert_eq!(summary.skipped_unreadable, 1);
        assert_eq!(summary.total_files, 3);
        assert!(groups.files.iter().all(|g| !g.paths.contains(&locked)));
        assert_eq!(groups.files.get(&digest(b"dup")).unwrap().len(), 2);
        assert!(summary
            .scan_errors
            .iter()
            .any(|e| matches!(e, ScanError::HashError(_)) && e.path() == locked));

        chmod(&locked, 0o644);
    }

    #[test]
    fn test_unreadable_file_best_effort_groups_partial_digest() {
        let dir = fixture();
        let locked = dir.path().join("locked.txt");
        if bypasses_permissions(&locked) {
            return;
        }

        let finder = DuplicateFinder::new(
            FinderConfig::default().with_read_error_policy(ReadErrorPolicy::BestEffort),
        );
        let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

        // Open failed, so zero bytes were read: same digest as the empty file.
        let group = groups.files.get(&empty_digest()).unwrap();
        assert_eq!(group.paths, vec![dir.path().join("empty"), locked.clone()]);
        assert_eq!(summary.skipped_unreadable, 0);
        assert_eq!(summary.total_files, 4);
        assert_eq!(summary.scan_errors.len(), 1);

        chmod(&locked, 0o644);
    }

    #[test]
    fn test_best_effort_group_sized_by_bytes_read() {
        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("a_locked");
        fs::write(&locked, "twelve bytes").unwrap();
        fs::write(dir.path().join("b_empty"), "").unwrap();
        fs::write(dir.path().join("c_empty"), "").unwrap();
        chmod(&locked, 0o000);
        if bypasses_permissions(&locked) {
            chmod(&locked, 0o644);
            return;
        }

        let finder = DuplicateFinder::new(
            FinderConfig::default().with_read_error_policy(ReadErrorPolicy::BestEffort),
        );
        let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();
        chmod(&locked, 0o644);

        // The unreadable file leads the empty-digest group.
        let group = groups.files.get(&empty_digest()).unwrap();
        assert_eq!(group.paths[0], locked);
        assert_eq!(group.len(), 3);
        assert_eq!(group.size, 0);
        assert_eq!(summary.reclaimable_space, 0);
        assert_eq!(summary.total_size, 0);
    }

    #[test]
    fn test_read_policy_reaches_directory_fingerprints() {
        let dir = fixture();
        let locked = dir.path().join("locked.txt");
        if bypasses_permissions(&locked) {
            return;
        }

        let run = |policy| {
            let finder = DuplicateFinder::new(
                FinderConfig::default()
                    .with_compare_dirs(true)
                    .with_read_error_policy(policy),
            );
            let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
            groups.directories.unwrap().iter().next().unwrap().hash
        };

        let mut skipped = Vec::new();
        for content in [&b"dup"[..], b"dup", b""] {
            skipped.extend_from_slice(&digest(content));
        }
        let mut best_effort = skipped.clone();
        best_effort.extend_from_slice(&empty_digest());

        assert_eq!(run(ReadErrorPolicy::Skip), digest(&skipped));
        assert_eq!(run(ReadErrorPolicy::BestEffort), digest(&best_effort));

        chmod(&locked, 0o644);
    }

    #[test]
    fn test_unreadable_directory_does_not_stop_the_walk() {
        let dir = TempDir::new().unwrap();
        let sealed = dir.path().join("sealed");
        fs::create_dir(&sealed).unwrap();
        fs::write(sealed.join("hidden.txt"), "dup").unwrap();
        fs::write(dir.path().join("visible1.txt"), "dup").unwrap();
        fs::write(dir.path().join("visible2.txt"), "dup").unwrap();
        chmod(&sealed, 0o000);

        if bypasses_permissions(&sealed) {
            chmod(&sealed, 0o755);
            return;
        }

        let finder = DuplicateFinder::new(FinderConfig::default().with_compare_dirs(true));
        let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();
        chmod(&sealed, 0o755);

        assert_eq!(groups.files.get(&digest(b"dup")).unwrap().len(), 2);
        assert!(summary
            .scan_errors
            .iter()
            .any(|e| matches!(e, ScanError::PermissionDenied(p) if p == &sealed)));

        // The sealed directory is still listed, with nothing readable below it.
        let dirs = groups.directories.unwrap();
        assert!(dirs.get(&empty_digest()).unwrap().paths.contains(&sealed));
    }
}
