//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::DeployerConfig;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<DeployerConfig> {
    store.load()
}

/// Validate and persist a single `key = value` change.
///
/// # Errors
///
/// Returns an error if the key or value is invalid, or the file cannot be
/// written. Nothing is written when validation fails.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<DeployerConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    tracing::info!(key, "configuration updated");
    Ok(config)
}
