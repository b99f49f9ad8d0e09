//! Integration tests for the atq CLI
//!
//! These tests verify end-to-end behavior of the CLI by running the
//! binary against fixture files and checking exit codes and output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Get the path to the atq binary
fn atq_binary() -> PathBuf {
    // Try release first, then debug
    let release = Path::new("target/release/atq");
    if release.exists() {
        return release.to_path_buf();
    }

    let debug = Path::new("target/debug/atq");
    if debug.exists() {
        return debug.to_path_buf();
    }

    panic!("atq binary not found. Run 'cargo build' first.");
}

/// Run atq on a fixture file with an attribute path
fn run_atq(fixture: &Path, attr: &[&str]) -> Output {
    let mut cmd = Command::new(atq_binary());
    cmd.arg("-f").arg(fixture).args(attr);
    cmd.output().expect("Failed to execute atq")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let text = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, text))
}

#[test]
fn test_whole_atlas_prints_as_json() {
    let output = run_atq(Path::new("tests/fixtures/valid/sheet.atlas"), &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value = stdout_json(&output);
    assert_eq!(value["pages"][0]["name"], "sheet.png");
    assert_eq!(value["pages"][0]["width"], 64);
    assert_eq!(value["regions"][0]["name"], "sprite1");
    assert_eq!(value["regions"][0]["rotate"], false);
    assert_eq!(value["regions"][0]["page"], "sheet.png");
}

#[test]
fn test_attribute_path_selects_a_field() {
    let output = run_atq(Path::new("tests/fixtures/valid/sheet.atlas"), &["pages", "0", "name"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "\"sheet.png\"");
}

#[test]
fn test_regions_stay_grouped_by_page() {
    let output = run_atq(Path::new("tests/fixtures/valid/multipage.atlas"), &["regions"]);
    assert!(output.status.success());

    let regions = stdout_json(&output);
    let pages: Vec<&str> =
        regions.as_array().unwrap().iter().map(|r| r["page"].as_str().unwrap()).collect();
    assert_eq!(pages, vec!["chars.png", "chars.png", "props.png"]);
}

#[test]
fn test_region_back_reference_navigates_to_page() {
    let output = run_atq(
        Path::new("tests/fixtures/valid/multipage.atlas"),
        &["regions", "2", "page", "name"],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "\"props.png\"");
}

#[test]
fn test_page_lookup_by_name() {
    let output = run_atq(
        Path::new("tests/fixtures/valid/multipage.atlas"),
        &["pages", "props.png", "format"],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "\"RGB565\"");
}

#[test]
fn test_malformed_field_fails_with_line_number() {
    let output = run_atq(Path::new("tests/fixtures/invalid/bad_size.atlas"), &[]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "stderr: {}", stderr);
    assert!(stderr.contains("size"), "stderr: {}", stderr);
}

#[test]
fn test_orphan_field_line_fails() {
    let output = run_atq(Path::new("tests/fixtures/invalid/orphan_field.atlas"), &[]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("before any page"), "stderr: {}", stderr);
}

#[test]
fn test_bad_attribute_path_fails() {
    let output = run_atq(Path::new("tests/fixtures/valid/sheet.atlas"), &["sprites"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("sprites"));
}

#[test]
fn test_missing_input_file_is_a_usage_error() {
    let output = run_atq(Path::new("tests/fixtures/no_such.atlas"), &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Cannot open input file"));
}

#[test]
fn test_reads_atlas_from_stdin() {
    let mut child = Command::new(atq_binary())
        .args(["pages", "0", "height"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn atq");

    child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(b"sheet.png\nsize: 64,48\nsprite1\n  xy: 0, 0\n")
        .expect("Failed to write stdin");

    let output = child.wait_with_output().expect("Failed to wait for atq");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "48");
}

#[test]
fn test_runs_against_a_scratch_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("scratch.atlas");
    fs::write(&path, "page.png\nr1\n  index: 5\n").expect("should write scratch atlas");

    let output = run_atq(&path, &["regions", "0", "index"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "5");
}
