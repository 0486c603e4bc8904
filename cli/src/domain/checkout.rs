//! Deploy state machine for the remote checkout.
//!
//! ```text
//! Absent  ──clone──▶ Cloned ─┐
//!                            ├─restart─▶ ProcessRestarted
//! Present ──sync───▶ Synced ─┘
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::error::DeployError;
use crate::domain::steps::DeployStep;

/// Source steps for a checkout that already exists, before the final sync.
const SYNC_STEPS: &[DeployStep] = &[DeployStep::Fetch, DeployStep::Checkout];

/// What to do when the local branch cannot fast-forward to upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivergencePolicy {
    /// `git pull --ff-only`; a divergent branch fails the run.
    #[default]
    Fail,
    /// `git reset --hard origin/<branch>`; local history is discarded.
    Reset,
}

impl DivergencePolicy {
    pub const VALID: &[&str] = &["fail", "reset"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Reset => "reset",
        }
    }
}

/// Position of a run in the deploy state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployState {
    /// No checkout on the remote host.
    Absent,
    /// A checkout exists on the remote host.
    Present,
    /// The checkout was just created by clone.
    Cloned,
    /// The existing checkout was brought to the branch tip.
    Synced,
    /// The managed process was stopped and started at the new HEAD.
    ProcessRestarted,
}

impl DeployState {
    /// Initial state from the checkout probe.
    #[must_use]
    pub fn from_probe(exists: bool) -> Self {
        if exists { Self::Present } else { Self::Absent }
    }

    /// Remote steps that materialise the source for this state.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidTransition` unless the state is
    /// `Absent` or `Present`.
    pub fn source_steps(self, policy: DivergencePolicy) -> Result<Vec<DeployStep>, DeployError> {
        match self {
            Self::Absent => Ok(vec![DeployStep::Clone]),
            Self::Present => {
                let mut steps = SYNC_STEPS.to_vec();
                steps.push(match policy {
                    DivergencePolicy::Fail => DeployStep::Pull,
                    DivergencePolicy::Reset => DeployStep::Reset,
                });
                Ok(steps)
            }
            other => Err(DeployError::InvalidTransition {
                from: other,
                to: "source sync",
            }),
        }
    }

    /// Transition after the source steps succeed.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidTransition` unless the state is
    /// `Absent` or `Present`.
    pub fn source_ready(self) -> Result<Self, DeployError> {
        match self {
            Self::Absent => Ok(Self::Cloned),
            Self::Present => Ok(Self::Synced),
            other => Err(DeployError::InvalidTransition {
                from: other,
                to: "Cloned/Synced",
            }),
        }
    }

    /// Transition after the managed process restarts.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidTransition` unless the state is
    /// `Cloned` or `Synced`.
    pub fn restarted(self) -> Result<Self, DeployError> {
        match self {
            Self::Cloned | Self::Synced => Ok(Self::ProcessRestarted),
            other => Err(DeployError::InvalidTransition {
                from: other,
                to: "ProcessRestarted",
            }),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Present => "present",
            Self::Cloned => "cloned",
            Self::Synced => "synced",
            Self::ProcessRestarted => "process_restarted",
        }
    }
}
