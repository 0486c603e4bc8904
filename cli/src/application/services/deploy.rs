//! Application service: deploy use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All remote I/O is routed through the injected `RemoteShell`.

use std::process::Output;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use tracing::Instrument as _;

use crate::application::ports::{ProgressReporter, RemoteShell};
use crate::domain::script::{GitCredentialScope, RemoteLayout, parse_verify_output, step_script};
use crate::domain::{
    CommandTimedOut, DeployError, DeployOutcome, DeployState, DeployStep, DeploymentRequest,
    DivergencePolicy, ExitDescription, StepRecord,
};

/// Exit status of `test -d` when the checkout is missing.
const PROBE_ABSENT_CODE: i32 = 1;

/// Per-run settings derived from configuration.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    /// Remote paths and entrypoints for the project.
    pub layout: RemoteLayout,
    /// Git hosting domain the credential scope applies to.
    pub source_host: String,
    /// How to handle a branch that cannot fast-forward.
    pub on_divergence: DivergencePolicy,
    /// Upper bound for any single remote step.
    pub step_timeout: Duration,
}

/// Deploy `request`, failing if the whole run exceeds `run_timeout`.
///
/// When the deadline fires the in-flight remote command is dropped (and
/// killed by the runner); no cleanup is attempted.
///
/// # Errors
///
/// Returns `DeployError::TimedOut` on deadline, otherwise whatever
/// [`deploy`] returns.
pub async fn deploy_with_deadline(
    shell: &impl RemoteShell,
    reporter: &impl ProgressReporter,
    request: &DeploymentRequest,
    settings: &DeploySettings,
    run_timeout: Duration,
) -> Result<DeployOutcome> {
    match tokio::time::timeout(run_timeout, deploy(shell, reporter, request, settings)).await {
        Ok(result) => result,
        Err(_) => Err(DeployError::TimedOut {
            minutes: run_timeout.as_secs().div_ceil(60),
        }
        .into()),
    }
}

/// Ensure the project is checked out at the branch tip on the remote host
/// and restart its managed process.
///
/// Steps run strictly in sequence and the first failure aborts the run.
///
/// # Errors
///
/// Returns `DeployError::StepFailed` or `DeployError::StepTimedOut` naming
/// the failed step, or
/// `DeployError::HeadMismatch` if the checkout did not land on the
/// upstream tip.
pub async fn deploy(
    shell: &impl RemoteShell,
    reporter: &impl ProgressReporter,
    request: &DeploymentRequest,
    settings: &DeploySettings,
) -> Result<DeployOutcome> {
    let span = tracing::info_span!(
        "deploy",
        project = request.project(),
        branch = request.branch(),
        host = %request.remote_host(),
    );
    let started_at = Utc::now();
    let mut run = Run::new(shell, reporter, request, settings);

    async move {
        tracing::info!("deployment starting");

        run.establish_credentials();

        let initial_state = run.probe().await?;
        let mut state = initial_state;
        if state == DeployState::Present && settings.on_divergence == DivergencePolicy::Reset {
            reporter.warn(&format!(
                "local commits on {} will be discarded if it diverged from origin",
                request.branch()
            ));
        }

        for step in state.source_steps(settings.on_divergence)? {
            run.execute(step).await?;
        }
        state = state.source_ready()?;
        let head = run.verify().await?;

        run.execute(DeployStep::Install).await?;
        run.execute(DeployStep::Stop).await?;
        run.execute(DeployStep::Start).await?;
        state = state.restarted()?;

        reporter.success(&format!(
            "{} deployed at {} ({})",
            request.project(),
            short_sha(&head),
            request.branch()
        ));
        tracing::info!(head = %head, state = state.as_str(), "deployment finished");

        Ok(DeployOutcome {
            project: request.project().to_string(),
            branch: request.branch().to_string(),
            host: request.remote_host().to_string(),
            checkout: settings.layout.checkout.clone(),
            initial_state,
            final_state: state,
            head,
            steps: run.records,
            started_at,
            finished_at: Utc::now(),
        })
    }
    .instrument(span)
    .await
}

/// Mutable bookkeeping for one deployment run.
struct Run<'a, S, R> {
    shell: &'a S,
    reporter: &'a R,
    request: &'a DeploymentRequest,
    settings: &'a DeploySettings,
    scope: Option<GitCredentialScope>,
    records: Vec<StepRecord>,
}

impl<'a, S: RemoteShell, R: ProgressReporter> Run<'a, S, R> {
    fn new(
        shell: &'a S,
        reporter: &'a R,
        request: &'a DeploymentRequest,
        settings: &'a DeploySettings,
    ) -> Self {
        Self {
            shell,
            reporter,
            request,
            settings,
            scope: None,
            records: Vec::new(),
        }
    }

    fn next_number(&self) -> usize {
        self.records.len() + 1
    }

    fn record(&mut self, step: DeployStep, started: Instant) {
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.records.push(StepRecord {
            number: self.next_number(),
            step,
            duration_ms,
        });
    }

    /// Build the credential scope used by every networked git step.
    fn establish_credentials(&mut self) {
        let started = Instant::now();
        self.reporter.step(&format!(
            "[{}] {}",
            self.next_number(),
            describe(DeployStep::Credentials)
        ));
        self.scope = Some(GitCredentialScope::new(
            &self.settings.source_host,
            self.request.github_token().clone(),
        ));
        tracing::debug!(source_host = %self.settings.source_host, "credential scope ready");
        self.record(DeployStep::Credentials, started);
    }

    /// Run the script for `step` and return its raw output.
    async fn run_script(&mut self, step: DeployStep) -> Result<(usize, Output)> {
        let number = self.next_number();
        self.reporter.step(&format!("[{number}] {}", describe(step)));
        let script = step_script(
            step,
            &self.settings.layout,
            self.request.branch(),
            self.scope.as_ref(),
        );

        let started = Instant::now();
        let output = match self
            .shell
            .exec_script(&script, self.settings.step_timeout)
            .instrument(tracing::info_span!("step", number, step = step.as_str()))
            .await
        {
            Ok(output) => output,
            Err(e) if e.downcast_ref::<CommandTimedOut>().is_some() => {
                tracing::warn!(number, step = step.as_str(), "step timed out");
                return Err(DeployError::StepTimedOut {
                    number,
                    step,
                    secs: self.settings.step_timeout.as_secs(),
                }
                .into());
            }
            Err(e) => {
                return Err(e.context(format!("deployment failed at step {number} ({step})")));
            }
        };
        self.record(step, started);

        tracing::debug!(
            number,
            step = step.as_str(),
            code = ?output.status.code(),
            stdout = %self.redacted(&output.stdout),
            "step finished"
        );
        Ok((number, output))
    }

    /// Run `step`, failing on any non-zero exit status.
    async fn execute(&mut self, step: DeployStep) -> Result<Output> {
        let (number, output) = self.run_script(step).await?;
        if !output.status.success() {
            return Err(self.step_failed(number, step, &output).into());
        }
        Ok(output)
    }

    /// Decide `Absent` / `Present` from `test -d`.
    async fn probe(&mut self) -> Result<DeployState> {
        let (number, output) = self.run_script(DeployStep::Probe).await?;
        let state = match output.status.code() {
            Some(0) => DeployState::from_probe(true),
            Some(PROBE_ABSENT_CODE) => DeployState::from_probe(false),
            _ => return Err(self.step_failed(number, DeployStep::Probe, &output).into()),
        };
        tracing::info!(state = state.as_str(), checkout = %self.settings.layout.checkout, "checkout probed");
        Ok(state)
    }

    /// Confirm HEAD is the upstream tip and return it.
    async fn verify(&mut self) -> Result<String> {
        let output = self.execute(DeployStep::Verify).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let (head, upstream) = parse_verify_output(&stdout)
            .ok_or_else(|| anyhow::anyhow!("unexpected output from git rev-parse: {stdout:?}"))?;
        if head != upstream {
            return Err(DeployError::HeadMismatch {
                branch: self.request.branch().to_string(),
                head,
                upstream,
            }
            .into());
        }
        Ok(head)
    }

    fn step_failed(&self, number: usize, step: DeployStep, output: &Output) -> DeployError {
        let status = output
            .status
            .code()
            .map_or(ExitDescription::Signal, ExitDescription::Code);
        tracing::warn!(number, step = step.as_str(), %status, "step failed");
        DeployError::StepFailed {
            number,
            step,
            status,
            stderr: self.redacted(&output.stderr),
        }
    }

    fn redacted(&self, bytes: &[u8]) -> String {
        self.request
            .github_token()
            .redact(&String::from_utf8_lossy(bytes))
    }
}

fn describe(step: DeployStep) -> &'static str {
    match step {
        DeployStep::Credentials => "scoping git credentials to this run",
        DeployStep::Probe => "checking for existing checkout",
        DeployStep::Clone => "cloning repository",
        DeployStep::Fetch => "fetching from upstream",
        DeployStep::Checkout => "checking out branch",
        DeployStep::Pull => "fast-forwarding branch",
        DeployStep::Reset => "resetting branch to upstream",
        DeployStep::Verify => "verifying HEAD matches upstream",
        DeployStep::Install => "running install step",
        DeployStep::Stop => "stopping managed process",
        DeployStep::Start => "starting managed process",
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}
