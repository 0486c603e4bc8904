//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`
//! sockets. All functions are synchronous and take data in, returning data out.

pub mod checkout;
pub mod config;
pub mod error;
pub mod outcome;
pub mod request;
pub mod script;
pub mod steps;

pub use checkout::{DeployState, DivergencePolicy};
pub use config::{DeployerConfig, validate_config_key, validate_config_value};
pub use error::{CommandTimedOut, ConfigError, DeployError, ExitDescription, RequestError};
pub use outcome::{CheckoutStatus, DeployOutcome, StepRecord};
pub use request::{DeploymentRequest, RemoteHost, Secret};
pub use steps::DeployStep;
