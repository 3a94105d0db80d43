//! Tests for configuration loading and directory validation
//!
//! Covers:
//! - Explicit config file must exist
//! - Input directory must exist and be a directory
//! - Output directory is created when absent
//! - Input and output must not resolve to the same location

use std::fs;
use svgb_common::config::{load_toml_config, Directories};
use svgb_common::Error;
use tempfile::TempDir;

#[test]
fn test_prepare_creates_missing_output() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("input");
    let output = root.path().join("nested").join("cropped");
    fs::create_dir(&input).unwrap();

    let dirs = Directories::prepare(&input, &output).unwrap();

    assert!(output.is_dir(), "output directory should be created");
    assert_eq!(dirs.input, input.canonicalize().unwrap());
    assert_eq!(dirs.output, output.canonicalize().unwrap());
}

#[test]
fn test_prepare_rejects_missing_input() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("does-not-exist");
    let output = root.path().join("out");

    let err = Directories::prepare(&input, &output).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains("does not exist"), "got: {}", msg),
        other => panic!("expected Config error, got {:?}", other),
    }
    assert!(!output.exists(), "output must not be created on failure");
}

#[test]
fn test_prepare_rejects_file_as_input() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("icon.svg");
    fs::write(&input, "<svg/>").unwrap();

    let err = Directories::prepare(&input, &root.path().join("out")).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains("not a directory"), "got: {}", msg),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_prepare_rejects_identical_directories() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("icons");
    fs::create_dir(&input).unwrap();

    // Same directory spelled differently
    let output = input.join(".");

    let err = Directories::prepare(&input, &output).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains("cannot be the same"), "got: {}", msg),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_load_explicit_config_file() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("config.toml");
    fs::write(&path, "open_browser = false\n[naming]\nalternate_suffix = \"-line\"\n").unwrap();

    let config = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.open_browser, Some(false));
    assert_eq!(config.naming.alternate_suffix.as_deref(), Some("-line"));
}

#[test]
fn test_load_missing_explicit_config_fails() {
    let root = TempDir::new().unwrap();
    let err = load_toml_config(Some(&root.path().join("missing.toml"))).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
