//! Infrastructure implementation of the `RemoteShell` port over OpenSSH.
//!
//! Every call opens a fresh `ssh ... bash -s` session and pipes the script
//! on stdin, so scripts (and the token some of them carry) never show up in
//! `ps` output on either host.

use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, RemoteShell};
use crate::domain::RemoteHost;
use crate::domain::config::SshConfig;

/// SSH session parameters for one target host.
#[derive(Debug, Clone)]
pub struct SshTarget {
    /// `user@host` destination.
    pub destination: String,
    pub port: Option<u16>,
    /// Private key passed with `-i`; `None` uses ssh defaults.
    pub identity: Option<PathBuf>,
    pub connect_timeout_secs: u64,
    pub strict_host_key_checking: String,
}

impl SshTarget {
    #[must_use]
    pub fn new(
        host: &RemoteHost,
        default_user: &str,
        identity: Option<PathBuf>,
        options: &SshConfig,
    ) -> Self {
        Self {
            destination: host.destination(default_user),
            port: host.port,
            identity,
            connect_timeout_secs: options.connect_timeout_secs,
            strict_host_key_checking: options.strict_host_key_checking.clone(),
        }
    }

    /// Full `ssh` argument list for running `bash -s` on the target.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout_secs),
            "-o".to_string(),
            format!("StrictHostKeyChecking={}", self.strict_host_key_checking),
        ];
        if let Some(identity) = &self.identity {
            args.push("-o".to_string());
            args.push("IdentitiesOnly=yes".to_string());
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push("--".to_string());
        args.push(self.destination.clone());
        args.push("bash".to_string());
        args.push("-s".to_string());
        args
    }
}

/// `RemoteShell` backed by the local `ssh` client.
pub struct SshRemoteShell<R> {
    runner: R,
    target: SshTarget,
}

impl<R: CommandRunner> SshRemoteShell<R> {
    #[must_use]
    pub fn new(runner: R, target: SshTarget) -> Self {
        Self { runner, target }
    }

    /// Check that an `ssh` client is installed.
    ///
    /// # Errors
    ///
    /// Returns an error if `ssh -V` cannot be run or fails.
    pub async fn preflight(&self) -> Result<()> {
        let output = self
            .runner
            .run("ssh", &["-V"])
            .await
            .context("OpenSSH client not found; install openssh-client")?;
        anyhow::ensure!(output.status.success(), "ssh -V failed");
        // OpenSSH prints its version on stderr.
        tracing::debug!(version = %String::from_utf8_lossy(&output.stderr).trim(), "ssh client");
        Ok(())
    }
}

impl<R: CommandRunner> RemoteShell for SshRemoteShell<R> {
    async fn exec_script(&self, script: &str, timeout: Duration) -> Result<Output> {
        let args = self.target.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run_with_stdin("ssh", &args, script.as_bytes(), timeout)
            .await
            .with_context(|| format!("ssh session to {}", self.target.destination))
    }
}
