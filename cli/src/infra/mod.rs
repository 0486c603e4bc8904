//! Infrastructure layer: process execution, SSH, secrets and config files.

pub mod command_runner;
pub mod config;
pub mod secrets;
pub mod ssh;
