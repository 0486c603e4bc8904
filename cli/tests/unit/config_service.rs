//! Tests for the configuration use-cases.

#![allow(clippy::expect_used)]

use deployer_cli::application::services::config_service::{load_config, set_value};
use deployer_cli::domain::{ConfigError, DeployerConfig, DivergencePolicy};

use crate::helpers::MemoryConfigStore;

#[test]
fn test_load_config_without_file_returns_defaults() {
    let store = MemoryConfigStore::default();
    assert_eq!(load_config(&store).expect("load"), DeployerConfig::default());
}

#[test]
fn test_set_value_persists_change() {
    let store = MemoryConfigStore::default();

    let config = set_value(&store, "sync.on_divergence", "reset").expect("set");

    assert_eq!(config.sync.on_divergence, DivergencePolicy::Reset);
    assert_eq!(*store.saves.lock().expect("saves"), 1);
    let reloaded = load_config(&store).expect("reload");
    assert_eq!(reloaded.sync.on_divergence, DivergencePolicy::Reset);
}

#[test]
fn test_set_value_keeps_earlier_changes() {
    let store = MemoryConfigStore::default();
    set_value(&store, "source.org", "acme").expect("set org");
    let config = set_value(&store, "remote.checkout_root", "/srv/apps").expect("set root");

    assert_eq!(config.source.org, "acme");
    assert_eq!(config.layout("search").checkout, "/srv/apps/search");
    assert_eq!(
        config.layout("search").upstream_url,
        "https://github.com/acme/search.git"
    );
}

#[test]
fn test_set_value_unknown_key_writes_nothing() {
    let store = MemoryConfigStore::default();

    let err = set_value(&store, "security.level", "strict").expect_err("unknown key");

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::UnknownKey { .. })
    ));
    assert_eq!(*store.saves.lock().expect("saves"), 0);
}

#[test]
fn test_set_value_invalid_value_writes_nothing() {
    let store = MemoryConfigStore::default();

    let err = set_value(&store, "timeouts.run_mins", "0").expect_err("invalid value");

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidValue { .. })
    ));
    assert_eq!(*store.saves.lock().expect("saves"), 0);
}
