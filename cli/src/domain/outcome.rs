//! Results reported by the deploy and status use-cases.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::checkout::DeployState;
use crate::domain::steps::DeployStep;

/// One executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// 1-based position in the run.
    pub number: usize,
    pub step: DeployStep,
    pub duration_ms: u64,
}

/// Summary of a successful deployment.
#[derive(Debug, Clone, Serialize)]
pub struct DeployOutcome {
    pub project: String,
    pub branch: String,
    pub host: String,
    pub checkout: String,
    /// State observed by the probe (`absent` or `present`).
    pub initial_state: DeployState,
    /// Always `process_restarted` for a successful run.
    pub final_state: DeployState,
    /// Commit the managed process was restarted at.
    pub head: String,
    pub steps: Vec<StepRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeployOutcome {
    /// Whether the run created the checkout.
    #[must_use]
    pub fn cloned(&self) -> bool {
        self.initial_state == DeployState::Absent
    }

    /// Steps in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<DeployStep> {
        self.steps.iter().map(|r| r.step).collect()
    }
}

/// Snapshot of a remote checkout, read without modifying anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutStatus {
    Absent,
    Present {
        /// Current branch, or `HEAD` when detached.
        branch: String,
        head: String,
        /// Tip of `origin/<branch>` as of the last fetch.
        upstream: Option<String>,
    },
}

impl CheckoutStatus {
    /// Parse the output of `domain::script::status_script`.
    ///
    /// # Errors
    ///
    /// Returns an error when the output does not follow the expected shape.
    pub fn parse(stdout: &str) -> anyhow::Result<Self> {
        let mut lines = stdout.lines().map(str::trim);
        match lines.next() {
            Some("absent") => Ok(Self::Absent),
            Some("present") => {
                let branch = lines
                    .next()
                    .filter(|l| !l.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("status output missing branch"))?;
                let head = lines
                    .next()
                    .filter(|l| crate::domain::script::is_object_id(l))
                    .ok_or_else(|| anyhow::anyhow!("status output missing HEAD"))?;
                let upstream = lines
                    .next()
                    .filter(|l| crate::domain::script::is_object_id(l))
                    .map(str::to_string);
                Ok(Self::Present {
                    branch: branch.to_string(),
                    head: head.to_string(),
                    upstream,
                })
            }
            other => anyhow::bail!("unexpected status output: {other:?}"),
        }
    }

    /// `Some(true)` when HEAD equals the upstream tip, `None` if unknown.
    #[must_use]
    pub fn up_to_date(&self) -> Option<bool> {
        match self {
            Self::Absent => None,
            Self::Present { head, upstream, .. } => upstream.as_ref().map(|u| u == head),
        }
    }
}
