//! Named steps of a deployment run.

use serde::Serialize;

/// A single remote command in a deployment, in the order it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployStep {
    /// Establish the per-run git credential scope.
    Credentials,
    /// Test whether the checkout directory exists.
    Probe,
    /// First deploy: clone the branch into the checkout.
    Clone,
    /// Later deploys: fetch from upstream.
    Fetch,
    /// Later deploys: switch to the target branch.
    Checkout,
    /// Later deploys: fast-forward the branch.
    Pull,
    /// Later deploys with the `reset` divergence policy.
    Reset,
    /// Run the project's install entrypoint.
    Install,
    /// Stop the managed process.
    Stop,
    /// Start the managed process.
    Start,
    /// Confirm HEAD matches the upstream tip.
    Verify,
}

impl DeployStep {
    /// Stable lowercase identifier used in logs and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::Probe => "probe",
            Self::Clone => "clone",
            Self::Fetch => "fetch",
            Self::Checkout => "checkout",
            Self::Pull => "pull",
            Self::Reset => "reset",
            Self::Install => "install",
            Self::Stop => "stop",
            Self::Start => "start",
            Self::Verify => "verify",
        }
    }

    /// Whether the step talks to the upstream repository.
    #[must_use]
    pub fn needs_credentials(self) -> bool {
        matches!(self, Self::Clone | Self::Fetch | Self::Pull)
    }
}

impl std::fmt::Display for DeployStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
