// tests/config_validation.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use tempfile::{NamedTempFile, TempDir};

use cam_baker::config::{RawConfigFile, load_and_validate, resolve_config};
use cam_baker::errors::BakerError;

type TestResult = Result<(), Box<dyn Error>>;

fn expect_config_error(raw: RawConfigFile, needle: &str) {
    match cam_baker::config::ConfigFile::try_from(raw) {
        Err(BakerError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} lacks {needle:?}")
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn empty_file_is_a_valid_zero_config_project() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(file, "")?;

    let config = load_and_validate(file.path())?;
    assert_eq!(config.src_dir(), "src");
    assert_eq!(config.forms_folder(), "forms");
    assert_eq!(config.entry_points().html, "index.html");
    assert_eq!(config.entry_points().jsx, "main.jsx");
    assert!(!config.build_on_watch());
    assert!(!config.engine().auto_deploy);
    assert_eq!(config.server().port, 8181);
    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
out_dir = "build"

[entry_points]
js = "app.js"
html = "form.html"

[watch]
build_on_watch = true

[engine]
server = "http://localhost:9090"
auto_deploy = true
process_glob = "bpmn/*.bpmn"
"#
    )?;

    let config = load_and_validate(file.path())?;
    assert_eq!(config.entry_points().js, "app.js");
    assert_eq!(config.entry_points().scss, "style.scss");
    assert_eq!(config.entry_points().html, "form.html");
    assert!(config.build_on_watch());
    assert!(config.engine().auto_deploy);
    assert!(config.is_process_definition("bpmn/invoice.bpmn"));
    assert!(!config.is_process_definition("src/invoice.bpmn"));

    let root = file
        .path()
        .parent()
        .ok_or("temp file has no parent")?
        .to_path_buf();
    assert_eq!(config.out_dir(), root.join("build"));
    Ok(())
}

#[test]
fn malformed_toml_returns_toml_error() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(file, "[entry_points\njs = ")?;

    match load_and_validate(file.path()) {
        Err(BakerError::TomlError(_)) => Ok(()),
        other => panic!("Expected TomlError, got: {:?}", other),
    }
}

#[test]
fn explicit_missing_config_is_an_error() -> TestResult {
    let dir = TempDir::new()?;
    let missing: PathBuf = dir.path().join("Missing.toml");

    match resolve_config(missing.to_str()) {
        Err(BakerError::ConfigError(msg)) => assert!(msg.contains("wasn't found")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
    Ok(())
}

#[test]
fn entry_names_must_be_literal_file_names() {
    let mut raw = RawConfigFile::default();
    raw.entry_points.js = "*.js".to_string();
    expect_config_error(raw, "literal file name");

    let mut raw = RawConfigFile::default();
    raw.entry_points.html = "pages/index.html".to_string();
    expect_config_error(raw, "not a path");

    let mut raw = RawConfigFile::default();
    raw.entry_points.scss = "".to_string();
    expect_config_error(raw, "must not be empty");
}

#[test]
fn entry_names_must_be_distinct_with_distinct_extensions() {
    let mut raw = RawConfigFile::default();
    raw.entry_points.jsx = "main.js".to_string();
    expect_config_error(raw, "reuses the file name");

    let mut raw = RawConfigFile::default();
    raw.entry_points.jsx = "other.js".to_string();
    expect_config_error(raw, "shares the extension");

    let mut raw = RawConfigFile::default();
    raw.entry_points.html = "index".to_string();
    expect_config_error(raw, "must have a file extension");
}

#[test]
fn directories_are_validated() {
    let mut raw = RawConfigFile::default();
    raw.src_dir = "src/app".to_string();
    expect_config_error(raw, "single literal folder name");

    let mut raw = RawConfigFile::default();
    raw.forms_folder = "forms*".to_string();
    expect_config_error(raw, "single literal folder name");

    let mut raw = RawConfigFile::default();
    raw.out_dir = "public".to_string();
    expect_config_error(raw, "must differ");

    let mut raw = RawConfigFile::default();
    raw.public_dir = "/var/www".to_string();
    expect_config_error(raw, "relative to the project root");

    let mut raw = RawConfigFile::default();
    raw.out_dir = "./src".to_string();
    expect_config_error(raw, "must not be the source directory");
}

#[test]
fn server_settings_are_validated() {
    let raw = ConfigFileBuilder::new().port(0).raw().clone();
    expect_config_error(raw, "[server].port");

    let raw = ConfigFileBuilder::new().server("localhost:8080").raw().clone();
    expect_config_error(raw, "http(s) URL");

    let raw = ConfigFileBuilder::new().process_glob("src/[.bpmn").raw().clone();
    expect_config_error(raw, "process_glob is invalid");
}
