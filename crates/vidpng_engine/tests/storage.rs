use std::fs;

use tempfile::TempDir;
use vidpng_engine::{ensure_download_dir, AtomicFileWriter};

#[test]
fn creates_missing_download_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_download_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_and_is_atomic() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("apng_results_t1.zip", b"old").unwrap();
    assert_eq!(first.file_name().unwrap(), "apng_results_t1.zip");
    assert_eq!(fs::read(&first).unwrap(), b"old");

    // Re-downloading the same task replaces the archive.
    let second = writer.write("apng_results_t1.zip", b"new").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"new");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("apng_results_t1.zip", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("apng_results_t1.zip").exists());
}
