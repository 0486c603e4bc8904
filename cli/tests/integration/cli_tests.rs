//! Integration tests for the CLI surface: help, version, global flags.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn deployer() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("deployer"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    deployer().assert().code(2).stderr(predicate::str::contains(
        "Idempotent \"ensure deployed\" executor",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    deployer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_deploy_help_documents_env_vars() {
    deployer()
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DEPLOY_PROJECT"))
        .stdout(predicate::str::contains("DEPLOY_BRANCH"))
        .stdout(predicate::str::contains("DEPLOY_HOST"))
        .stdout(predicate::str::contains("--timeout"));
}

#[test]
fn test_version_command_shows_version() {
    deployer()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "deployer ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = deployer()
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

// --- Global flags tests ---

#[test]
fn test_global_quiet_flag_silences_version() {
    deployer()
        .args(["--quiet", "version"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_verbose_flag_is_repeatable() {
    deployer().args(["-vv", "version"]).assert().success();
}

// --- Error handling tests ---

#[test]
fn test_unknown_command_exits_with_error() {
    deployer()
        .arg("rollback")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_zero_timeout_rejected_by_parser() {
    deployer()
        .args(["deploy", "--project", "p", "--host", "h", "--timeout", "0"])
        .assert()
        .code(2);
}
