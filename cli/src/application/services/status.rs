//! Application service: read-only remote checkout status.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::RemoteShell;
use crate::domain::CheckoutStatus;
use crate::domain::script::{RemoteLayout, status_script};

/// Inspect the checkout described by `layout` without changing it.
///
/// # Errors
///
/// Returns an error if the remote session fails or prints unexpected output.
pub async fn checkout_status(
    shell: &impl RemoteShell,
    layout: &RemoteLayout,
    branch: &str,
    timeout: Duration,
) -> Result<CheckoutStatus> {
    let output = shell
        .exec_script(&status_script(layout, branch), timeout)
        .await
        .context("querying remote checkout")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "status query failed ({}): {}",
            output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| format!("exit {c}")),
            stderr.trim()
        );
    }
    let status = CheckoutStatus::parse(&String::from_utf8_lossy(&output.stdout))?;
    tracing::info!(checkout = %layout.checkout, ?status, "checkout status");
    Ok(status)
}
