//! Secrets injected by the CI runner through environment variables.
//!
//! The secrets manager mounts values into the build step's environment;
//! this module is the only place that reads them.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::application::ports::SecretSource;
use crate::domain::{RequestError, Secret};

/// Preferred token variable.
pub const GIT_TOKEN_VAR: &str = "DEPLOYER_GIT_TOKEN";
/// Fallback token variable set by most CI runners.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
/// Private key material.
pub const SSH_KEY_VAR: &str = "DEPLOYER_SSH_KEY";
/// Path to a private key file.
pub const SSH_KEY_FILE_VAR: &str = "DEPLOYER_SSH_KEY_FILE";

/// Reads secrets from the process environment.
#[derive(Debug, Default)]
pub struct EnvSecretSource;

impl SecretSource for EnvSecretSource {
    fn git_token(&self) -> Result<Secret> {
        [GIT_TOKEN_VAR, GITHUB_TOKEN_VAR]
            .iter()
            .find_map(|var| non_empty_var(var))
            .map(|token| Secret::new(token.trim()))
            .ok_or_else(|| RequestError::MissingSecret(GIT_TOKEN_VAR).into())
    }
}

impl EnvSecretSource {
    /// Resolve the SSH identity to use, if any was provided.
    ///
    /// Key material in `DEPLOYER_SSH_KEY` takes precedence over a path in
    /// `DEPLOYER_SSH_KEY_FILE`. `None` means ssh falls back to the user's
    /// default identities and agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the key file does not exist or the key material
    /// cannot be written to a private temporary file.
    pub fn ssh_identity(&self) -> Result<Option<SshIdentity>> {
        if let Some(material) = non_empty_var(SSH_KEY_VAR) {
            return SshIdentity::from_material(&Secret::new(material)).map(Some);
        }
        if let Some(path) = non_empty_var(SSH_KEY_FILE_VAR) {
            let path = PathBuf::from(path);
            anyhow::ensure!(
                path.is_file(),
                "{SSH_KEY_FILE_VAR} points to {} which is not a file",
                path.display()
            );
            return Ok(Some(SshIdentity::File(path)));
        }
        Ok(None)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// An SSH private key available as a file for the duration of a run.
#[derive(Debug)]
pub enum SshIdentity {
    /// Key file owned by the caller.
    File(PathBuf),
    /// Key material written to a 0600 temp file, deleted on drop.
    Ephemeral(NamedTempFile),
}

impl SshIdentity {
    /// Write key material to a private temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be created or written.
    pub fn from_material(material: &Secret) -> Result<Self> {
        // NamedTempFile is created with mode 0600 on Unix.
        let mut file = tempfile::Builder::new()
            .prefix("deployer-key-")
            .tempfile()
            .context("creating temporary SSH key file")?;
        let mut key = material.expose().replace("\r\n", "\n");
        if !key.ends_with('\n') {
            key.push('\n');
        }
        file.write_all(key.as_bytes())
            .context("writing temporary SSH key file")?;
        file.flush().context("flushing temporary SSH key file")?;
        Ok(Self::Ephemeral(file))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) => path,
            Self::Ephemeral(file) => file.path(),
        }
    }
}
