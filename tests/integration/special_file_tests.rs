//! Sockets and FIFOs are counted but never fingerprinted.

#![cfg(unix)]

use std::fs;
use std::os::unix::net::UnixListener;
use std::process::Command;
use tempfile::TempDir;
use treedupe::duplicates::{DuplicateFinder, FinderConfig};
use treedupe::scanner::digest;

#[test]
fn test_fifo_and_socket_are_skipped() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a"), "x").unwrap();
    let fifo = dir.path().join("pipe");
    // No mkfifo on this host: nothing to exercise.
    match Command::new("mkfifo").arg(&fifo).status() {
        Ok(status) if status.success() => {}
        _ => return,
    }
    let _listener = UnixListener::bind(dir.path().join("sock")).unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_compare_dirs(true));
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.skipped_special, 2);
    assert!(summary.scan_errors.is_empty());
    assert_eq!(groups.files.total_members(), 1);
    assert_eq!(
        groups.files.get(&digest(b"x")).unwrap().paths,
        vec![dir.path().join("a")]
    );

    let dirs = groups.directories.unwrap();
    assert_eq!(
        dirs.get(&digest(&digest(b"x"))).unwrap().paths,
        vec![dir.path().to_path_buf()]
    );
}
