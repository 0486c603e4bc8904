//! Unit tests for deployer CLI
//!
//! These tests use in-memory port implementations and run fast without
//! SSH or a remote host.

mod architecture;
mod config_service;
mod deploy_service;
mod secrets_env;
