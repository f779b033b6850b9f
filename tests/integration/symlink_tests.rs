//! Symlinks are never fingerprinted, grouped or followed.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::symlink;
use tempfile::TempDir;
use treedupe::duplicates::{DuplicateFinder, FinderConfig};
use treedupe::scanner::{digest, empty_digest};

fn compare_dirs() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_compare_dirs(true))
}

#[test]
fn test_file_symlink_is_not_a_group_member() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("real.txt");
    let link = dir.path().join("link.txt");
    fs::write(&target, "content").unwrap();
    symlink(&target, &link).unwrap();

    let (groups, summary) = compare_dirs().find_duplicates(dir.path()).unwrap();

    let group = groups.files.get(&digest(b"content")).unwrap();
    assert_eq!(group.paths, vec![target]);
    assert_eq!(summary.skipped_symlinks, 1);
    assert_eq!(summary.duplicate_files, 0);

    let dirs = groups.directories.unwrap();
    assert!(dirs.iter().all(|g| !g.paths.contains(&link)));
}

#[test]
fn test_directory_symlink_is_not_descended() {
    let dir = TempDir::new().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("f.txt"), "once").unwrap();
    symlink(&real, dir.path().join("alias")).unwrap();

    let (groups, summary) = compare_dirs().find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.files.get(&digest(b"once")).unwrap().len(), 1);
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.skipped_symlinks, 1);

    // root and real only
    let dirs = groups.directories.unwrap();
    assert_eq!(dirs.total_members(), 2);
    assert!(dirs.duplicates().next().is_none());
}

#[test]
fn test_symlink_only_directory_matches_empty_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("target.txt"), "t").unwrap();
    fs::create_dir(dir.path().join("e1")).unwrap();
    fs::create_dir(dir.path().join("e2")).unwrap();
    symlink(dir.path().join("target.txt"), dir.path().join("e2/only-a-link")).unwrap();

    let (groups, summary) = compare_dirs().find_duplicates(dir.path()).unwrap();

    let dirs = groups.directories.unwrap();
    let group = dirs.get(&empty_digest()).unwrap();
    assert_eq!(
        group.paths,
        vec![dir.path().join("e1"), dir.path().join("e2")]
    );
    assert_eq!(summary.duplicate_directories, 1);
}

#[test]
fn test_dangling_symlink_is_harmless() {
    let dir = TempDir::new().unwrap();
    symlink(dir.path().join("nowhere"), dir.path().join("broken")).unwrap();
    fs::write(dir.path().join("a"), "x").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.files.total_members(), 1);
    assert_eq!(summary.skipped_symlinks, 1);
    assert!(summary.scan_errors.is_empty());
}

#[test]
fn test_symlinked_directory_root_is_not_followed() {
    let dir = TempDir::new().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("f1"), "same").unwrap();
    fs::write(real.join("f2"), "same").unwrap();
    let link = dir.path().join("link");
    symlink(&real, &link).unwrap();

    let (groups, summary) = compare_dirs().find_duplicates(&link).unwrap();

    assert!(groups.files.is_empty());
    assert!(groups.directories.unwrap().is_empty());
    assert_eq!(summary.skipped_symlinks, 1);
    assert!(summary.scan_errors.is_empty());
}

#[test]
fn test_symlinked_file_root_is_not_followed() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("target.txt");
    fs::write(&target, "content").unwrap();
    let link = dir.path().join("link.txt");
    symlink(&target, &link).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&link)
        .unwrap();

    assert!(groups.files.get(&digest(b"content")).is_none());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.skipped_symlinks, 1);
}
