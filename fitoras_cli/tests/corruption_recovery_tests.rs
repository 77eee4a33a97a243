//! Corruption recovery tests for the fitoras binary.
//!
//! These tests verify the system can handle:
//! - Corrupted split, tag and completion files
//! - A corrupted catalog cache
//! - Missing files

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fitoras"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn write_data(temp_dir: &TempDir, relative: &str, contents: &str) {
    let path = temp_dir.path().join("data").join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).expect("Failed to write corrupted file");
}

#[test]
fn test_corrupted_splits_file() {
    let temp_dir = setup_test_dir();
    write_data(&temp_dir, "splits/splits.json", "{ invalid json }}}}");

    cli(&temp_dir)
        .args(["split", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No splits yet"));

    // New writes replace the unreadable file
    cli(&temp_dir).args(["split", "add", "Fresh"]).assert().success();
    cli(&temp_dir)
        .args(["split", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fresh"));
}

#[test]
fn test_corrupted_completion_log() {
    let temp_dir = setup_test_dir();
    write_data(&temp_dir, "calendar/completions.json", "[1, 2, 3]");

    cli(&temp_dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts:  0"));
}

#[test]
fn test_corrupted_tags_file() {
    let temp_dir = setup_test_dir();
    write_data(&temp_dir, "categories/categories.json", "not json");

    cli(&temp_dir).args(["tag", "list"]).assert().success();
}

#[test]
fn test_corrupted_catalog_cache_reports_missing_catalog() {
    let temp_dir = setup_test_dir();
    write_data(&temp_dir, "exercises/catalog.json", "{\"broken\": ");

    cli(&temp_dir)
        .args(["catalog", "search", "bench"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalog not cached yet"));
}

#[test]
fn test_missing_data_dir() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["day", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing scheduled."));
}

#[test]
fn test_invalid_date_rejected() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["day", "--date", "01/01/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected YYYY-MM-DD"));
}
