//! Integration tests for the birthday-provision binary
//!
//! Every case here is rejected before the host is touched, so the suite is
//! safe to run on a developer machine or as root in CI.

#![allow(clippy::expect_used)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn provision() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("birthday-provision"));
    cmd.env("NO_COLOR", "1")
        .env_remove("BIRTHDAY_PROVISION_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Point at a settings file that does not exist so defaults apply.
fn no_config(dir: &Path) -> String {
    dir.join("absent.yaml").display().to_string()
}

// --- Help and version ---

#[test]
fn test_help_lists_run_options() {
    provision()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--generate-unit"))
        .stdout(predicate::str::contains("--start"));
}

#[test]
fn test_version_flag_shows_version() {
    provision()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("birthday-provision"));
}

#[test]
fn test_unknown_flag_is_a_usage_error() {
    provision()
        .arg("--frobnicate")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("--frobnicate"));
}

// --- Settings validation ---

#[test]
fn test_invalid_timezone_flag_exits_64() {
    let dir = tempfile::tempdir().expect("tempdir");
    provision()
        .args(["--config", &no_config(dir.path()), "--timezone", "Mars Base"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid timezone 'Mars Base'"));
}

#[test]
fn test_invalid_service_name_exits_64() {
    let dir = tempfile::tempdir().expect("tempdir");
    provision()
        .args(["--config", &no_config(dir.path()), "--service-name", "../etc"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid service name"));
}

#[test]
fn test_relative_install_dir_exits_64() {
    let dir = tempfile::tempdir().expect("tempdir");
    provision()
        .args(["--config", &no_config(dir.path()), "--install-dir", "bot"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid install directory"));
}

#[test]
fn test_root_service_user_exits_64() {
    let dir = tempfile::tempdir().expect("tempdir");
    provision()
        .args(["--config", &no_config(dir.path()), "--service-user", "root"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("must not run as root"));
}

#[test]
fn test_unparseable_settings_file_exits_64() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "service_name: bot\nflavour: vanilla\n").expect("write");
    provision()
        .args(["--config", path.to_str().expect("utf-8 path")])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("cannot parse"));
}

#[test]
fn test_settings_path_from_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "timezone: \"Not A Zone\"\n").expect("write");
    provision()
        .env("BIRTHDAY_PROVISION_CONFIG", &path)
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid timezone 'Not A Zone'"));
}

#[test]
fn test_flags_override_settings_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "timezone: Europe/Berlin\n").expect("write");
    provision()
        .args(["--config", path.to_str().expect("utf-8 path"), "--timezone", "bad zone"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid timezone 'bad zone'"));
}

#[test]
fn test_no_color_accepts_any_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    for value in ["1", "yes", "true"] {
        provision()
            .env("NO_COLOR", value)
            .args(["--config", &no_config(dir.path()), "--timezone", "Mars Base"])
            .assert()
            .code(64)
            .stderr(predicate::str::contains("Invalid timezone 'Mars Base'"))
            .stderr(predicate::str::contains("--no-color").not());
    }
}

#[test]
fn test_no_color_flag_without_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    provision()
        .env_remove("NO_COLOR")
        .args(["--no-color", "--config", &no_config(dir.path()), "--service-name", "../etc"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid service name"));
}

// --- JSON mode ---

#[test]
fn test_json_usage_error_is_a_single_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = provision()
        .args(["--json", "--config", &no_config(dir.path()), "--timezone", "x y"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(64));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is one JSON document");
    assert_eq!(value["error"], true);
    assert_eq!(value["exit_code"], 64);
    assert!(
        value["message"]
            .as_str()
            .is_some_and(|m| m.contains("Invalid timezone"))
    );
}

#[test]
fn test_quiet_still_reports_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    provision()
        .args(["-q", "--config", &no_config(dir.path()), "--timezone", "x y"])
        .assert()
        .code(64)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid timezone"));
}
