//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document on
//! stdout: the command result, or the error object on failure.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{CheckoutStatus, DeployOutcome, DeployerConfig};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders command results as JSON on stdout.
pub struct JsonRenderer;

#[derive(Serialize)]
struct StatusDocument<'a> {
    project: &'a str,
    branch: &'a str,
    host: &'a str,
    checkout: &'a str,
    #[serde(flatten)]
    status: &'a CheckoutStatus,
    up_to_date: Option<bool>,
}

impl JsonRenderer {
    fn print(value: &impl Serialize) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("JSON serialization failed")?
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(version: &str) -> Result<()> {
        Self::print(&serde_json::json!({ "version": version }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_outcome(outcome: &DeployOutcome) -> Result<()> {
        Self::print(outcome)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_status(
        project: &str,
        branch: &str,
        host: &str,
        checkout: &str,
        status: &CheckoutStatus,
    ) -> Result<()> {
        Self::print(&StatusDocument {
            project,
            branch,
            host,
            checkout,
            status,
            up_to_date: status.up_to_date(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(config: &DeployerConfig, path: &Path) -> Result<()> {
        Self::print(&serde_json::json!({
            "path": path.display().to_string(),
            "config": config,
        }))
    }
}
