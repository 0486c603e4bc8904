//! Domain types and validators for deployer configuration.
//!
//! Pure functions only, no I/O.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::checkout::DivergencePolicy;
use crate::domain::error::ConfigError;
use crate::domain::request::{checkout_path, upstream_url};
use crate::domain::script::RemoteLayout;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "source.host",
    "source.org",
    "remote.user",
    "remote.checkout_root",
    "remote.venv",
    "remote.install",
    "remote.control",
    "sync.on_divergence",
    "ssh.connect_timeout_secs",
    "ssh.strict_host_key_checking",
    "timeouts.step_secs",
    "timeouts.run_mins",
];

pub const VALID_HOST_KEY_CHECKING: &[&str] = &["yes", "accept-new", "no"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.deployer/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DeployerConfig {
    pub source: SourceConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub ssh: SshConfig,
    pub timeouts: TimeoutConfig,
}

/// Upstream repository location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    /// Git hosting domain.
    pub host: String,
    /// Organisation or user owning the repositories.
    pub org: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: "github.com".to_string(),
            org: "swirlai".to_string(),
        }
    }
}

/// Remote host conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteConfig {
    /// Login used when the host has no `user@` part.
    pub user: String,
    /// Directory holding one checkout per project.
    pub checkout_root: String,
    /// Virtual environment directory, relative to the checkout.
    pub venv: String,
    /// Install entrypoint run from the checkout.
    pub install: String,
    /// Control entrypoint taking `stop` / `start`.
    pub control: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            user: "deployer".to_string(),
            checkout_root: "/home/deployer".to_string(),
            venv: "venv".to_string(),
            install: "./install.sh".to_string(),
            control: "python swirl.py".to_string(),
        }
    }
}

/// Source synchronisation policy.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    pub on_divergence: DivergencePolicy,
}

/// SSH client options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshConfig {
    pub connect_timeout_secs: u64,
    pub strict_host_key_checking: String,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            strict_host_key_checking: "accept-new".to_string(),
        }
    }
}

/// Step and whole-run time limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    pub step_secs: u64,
    pub run_mins: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            step_secs: 900,
            run_mins: 30,
        }
    }
}

impl DeployerConfig {
    /// Remote layout for `project` under this configuration.
    #[must_use]
    pub fn layout(&self, project: &str) -> RemoteLayout {
        RemoteLayout {
            checkout: checkout_path(&self.remote.checkout_root, project),
            upstream_url: upstream_url(&self.source.host, &self.source.org, project),
            venv: self.remote.venv.clone(),
            install: self.remote.install.clone(),
            control: self.remote.control.clone(),
        }
    }

    /// Every settable key with its current value, in `VALID_CONFIG_KEYS` order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        VALID_CONFIG_KEYS
            .iter()
            .map(|key| {
                let value = match *key {
                    "source.host" => self.source.host.clone(),
                    "source.org" => self.source.org.clone(),
                    "remote.user" => self.remote.user.clone(),
                    "remote.checkout_root" => self.remote.checkout_root.clone(),
                    "remote.venv" => self.remote.venv.clone(),
                    "remote.install" => self.remote.install.clone(),
                    "remote.control" => self.remote.control.clone(),
                    "sync.on_divergence" => self.sync.on_divergence.as_str().to_string(),
                    "ssh.connect_timeout_secs" => self.ssh.connect_timeout_secs.to_string(),
                    "ssh.strict_host_key_checking" => self.ssh.strict_host_key_checking.clone(),
                    "timeouts.step_secs" => self.timeouts.step_secs.to_string(),
                    "timeouts.run_mins" => self.timeouts.run_mins.to_string(),
                    _ => String::new(),
                };
                (*key, value)
            })
            .collect()
    }

    /// Check every setting against the rules `set` enforces.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first setting that fails.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.entries() {
            validate_config_value(key, &value)?;
        }
        Ok(())
    }

    /// Set a dotted key to a validated value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "source.host" => self.source.host = value.to_string(),
            "source.org" => self.source.org = value.to_string(),
            "remote.user" => self.remote.user = value.to_string(),
            "remote.checkout_root" => self.remote.checkout_root = value.to_string(),
            "remote.venv" => self.remote.venv = value.to_string(),
            "remote.install" => self.remote.install = value.to_string(),
            "remote.control" => self.remote.control = value.to_string(),
            "sync.on_divergence" => {
                self.sync.on_divergence = if value == "reset" {
                    DivergencePolicy::Reset
                } else {
                    DivergencePolicy::Fail
                };
            }
            "ssh.connect_timeout_secs" => self.ssh.connect_timeout_secs = parse_positive(value)?,
            "ssh.strict_host_key_checking" => {
                self.ssh.strict_host_key_checking = value.to_string();
            }
            "timeouts.step_secs" => self.timeouts.step_secs = parse_positive(value)?,
            "timeouts.run_mins" => self.timeouts.run_mins = parse_positive(value)?,
            _ => {}
        }
        Ok(())
    }
}

fn parse_positive(value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| anyhow::anyhow!("expected a positive integer, got {value:?}"))
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |valid: &str| -> Result<()> {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid: valid.to_string(),
        }
        .into())
    };

    match key {
        "sync.on_divergence" if !DivergencePolicy::VALID.contains(&value) => {
            invalid(&DivergencePolicy::VALID.join(", "))
        }
        "ssh.strict_host_key_checking" if !VALID_HOST_KEY_CHECKING.contains(&value) => {
            invalid(&VALID_HOST_KEY_CHECKING.join(", "))
        }
        "ssh.connect_timeout_secs" | "timeouts.step_secs" | "timeouts.run_mins"
            if parse_positive(value).is_err() =>
        {
            invalid("a positive integer")
        }
        "remote.checkout_root" if !value.starts_with('/') => invalid("an absolute path"),
        _ if value.trim().is_empty() => invalid("a non-empty string"),
        _ => Ok(()),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
