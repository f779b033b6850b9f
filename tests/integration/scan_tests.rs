//! End-to-end file grouping scans.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use treedupe::duplicates::{DuplicateFinder, FinderConfig};
use treedupe::scanner::{digest, empty_digest};

fn names(paths: &[std::path::PathBuf], root: &Path) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_hello_hello_world() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();
    fs::write(dir.path().join("c.txt"), "world").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let dups: Vec<_> = groups.files.duplicates().collect();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].hash, digest(b"hello"));
    assert_eq!(names(&dups[0].paths, dir.path()), vec!["a.txt", "b.txt"]);

    let lone = groups.files.get(&digest(b"world")).unwrap();
    assert_eq!(names(&lone.paths, dir.path()), vec!["c.txt"]);

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 5);
    assert_eq!(summary.total_size, 15);
    assert!(summary.has_duplicates());
    assert!(!summary.has_errors());
}

#[test]
fn test_root_without_regular_files() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.files.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_files, 0);
    assert_eq!(summary.reclaimable_space, 0);
    assert!(!summary.has_duplicates());
}

#[test]
fn test_nested_duplicates_are_found() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("x/y/z")).unwrap();
    fs::write(dir.path().join("top.bin"), b"payload").unwrap();
    fs::write(dir.path().join("x/y/z/deep.bin"), b"payload").unwrap();
    fs::write(dir.path().join("x/other.bin"), b"payload").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let group = groups.files.get(&digest(b"payload")).unwrap();
    assert_eq!(group.len(), 3);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.reclaimable_space, 14);
}

#[test]
fn test_empty_files_share_the_empty_digest() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("one"), b"").unwrap();
    fs::write(dir.path().join("two"), b"").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let group = groups.files.get(&empty_digest()).unwrap();
    assert_eq!(group.len(), 2);
    assert_eq!(group.size, 0);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_membership_order_is_stable_across_thread_counts() {
    let dir = TempDir::new().unwrap();
    for i in 0..40 {
        let sub = dir.path().join(format!("d{}", i % 4));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("f{i:02}")), format!("content {}", i % 5)).unwrap();
    }

    let run = |threads: usize| {
        let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(threads));
        let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
        groups
            .files
            .iter()
            .map(|g| (g.hash, g.paths.clone()))
            .collect::<Vec<_>>()
    };

    let single = run(1);
    assert_eq!(single.len(), 5);
    assert_eq!(single, run(8));
    assert_eq!(single, run(1));
}

#[test]
fn test_recorded_paths_are_absolute() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("f"), b"x").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(summary.root.is_absolute());
    for group in groups.files.iter() {
        assert!(group.paths.iter().all(|p| p.is_absolute()));
    }
}

#[test]
fn test_file_as_root() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("single.txt");
    fs::write(&file, b"alone").unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_compare_dirs(true));
    let (groups, summary) = finder.find_duplicates(&file).unwrap();

    assert_eq!(summary.total_files, 1);
    assert_eq!(groups.files.get(&digest(b"alone")).unwrap().paths, vec![file]);
    assert!(groups.directories.unwrap().is_empty());
}
