//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::checkout::DeployState;
use crate::domain::steps::DeployStep;

// ── Request errors ────────────────────────────────────────────────────────────

/// Errors raised while building a `DeploymentRequest` from user input.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid project name '{0}': must match ^[A-Za-z0-9][A-Za-z0-9._-]{{0,99}}$")]
    InvalidProject(String),

    #[error("Invalid branch name '{name}': {reason}")]
    InvalidBranch { name: String, reason: &'static str },

    #[error("Invalid remote host '{host}': {reason}")]
    InvalidHost { host: String, reason: &'static str },

    #[error("Missing secret: set {0}")]
    MissingSecret(&'static str),
}

// ── Deploy errors ─────────────────────────────────────────────────────────────

/// Errors raised while executing a deployment.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deployment failed at step {number} ({step}): {status}{detail}", detail = stderr_tail(.stderr))]
    StepFailed {
        number: usize,
        step: DeployStep,
        status: ExitDescription,
        stderr: String,
    },

    #[error("deployment failed at step {number} ({step}): timed out after {secs}s")]
    StepTimedOut {
        number: usize,
        step: DeployStep,
        secs: u64,
    },

    #[error("deployment timed out after {minutes} minutes")]
    TimedOut { minutes: u64 },

    #[error(
        "checkout HEAD {head} does not match upstream {branch} tip {upstream} after sync"
    )]
    HeadMismatch {
        branch: String,
        head: String,
        upstream: String,
    },

    #[error("invalid deploy state transition: {from:?} cannot move to {to}")]
    InvalidTransition { from: DeployState, to: &'static str },
}

/// Exit status of a failed remote command, without depending on `std::process`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDescription {
    Code(i32),
    Signal,
}

impl std::fmt::Display for ExitDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit status {code}"),
            Self::Signal => f.write_str("terminated by signal"),
        }
    }
}

/// A local process outlived its time limit and was killed.
#[derive(Debug, Error)]
#[error("{program} timed out after {secs}s")]
pub struct CommandTimedOut {
    pub program: String,
    pub secs: u64,
}

/// Number of trailing stderr lines carried in a `StepFailed` message.
const STDERR_TAIL_LINES: usize = 5;

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return String::new();
    }
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    format!("\n  {}", lines[start..].join("\n  "))
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}

/// Machine-readable code for an error chain, used by `--json` error output.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if err.downcast_ref::<RequestError>().is_some() {
        return "invalid_request";
    }
    if let Some(deploy) = err.downcast_ref::<DeployError>() {
        return match deploy {
            DeployError::StepFailed { .. } => "step_failed",
            DeployError::StepTimedOut { .. } | DeployError::TimedOut { .. } => "timed_out",
            DeployError::HeadMismatch { .. } => "head_mismatch",
            DeployError::InvalidTransition { .. } => "internal",
        };
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return "config";
    }
    if err.downcast_ref::<CommandTimedOut>().is_some() {
        return "timed_out";
    }
    "error"
}
