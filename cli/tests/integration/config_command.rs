//! Integration tests for `deployer config`.
//!
//! All filesystem-touching tests set `DEPLOYER_CONFIG` to a temp path so they
//! never read or write `~/.deployer/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn deployer(config: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("deployer"));
    cmd.env("NO_COLOR", "1").env("DEPLOYER_CONFIG", config);
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

#[test]
fn test_config_show_without_file_prints_defaults() {
    let (_dir, path) = temp_config_path();
    deployer(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("remote.checkout_root"))
        .stdout(predicate::str::contains("/home/deployer"))
        .stdout(predicate::str::contains(&path));
    assert!(!std::path::Path::new(&path).exists(), "show must not write");
}

#[test]
fn test_config_set_persists_and_show_reflects_it() {
    let (_dir, path) = temp_config_path();
    deployer(&path)
        .args(["config", "set", "sync.on_divergence", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set sync.on_divergence = reset"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("on_divergence: reset"), "got: {content}");

    let output = deployer(&path)
        .args(["config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["config"]["sync"]["on_divergence"], "reset");
    assert_eq!(value["config"]["source"]["host"], "github.com");
}

#[cfg(unix)]
#[test]
fn test_config_set_writes_private_file() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = temp_config_path();
    deployer(&path)
        .args(["config", "set", "source.org", "acme"])
        .assert()
        .success();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_config_set_unknown_key_lists_valid_keys() {
    let (_dir, path) = temp_config_path();
    deployer(&path)
        .args(["config", "set", "security.level", "strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting: security.level"))
        .stderr(predicate::str::contains("sync.on_divergence"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_invalid_value_json_error() {
    let (_dir, path) = temp_config_path();
    let output = deployer(&path)
        .args(["--json", "config", "set", "timeouts.run_mins", "soon"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "config");
}
