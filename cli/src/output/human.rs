//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::domain::{CheckoutStatus, DeployOutcome, DeployerConfig, StepRecord};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("deployer {version}");
    }

    /// Render the summary of a finished deployment.
    pub fn render_outcome(&self, outcome: &DeployOutcome) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.kv("Project: ", &outcome.project);
        self.ctx.kv("Branch:  ", &outcome.branch);
        self.ctx.kv("Host:    ", &outcome.host);
        self.ctx.kv("Checkout:", &outcome.checkout);
        self.ctx.kv(
            "HEAD:    ",
            &format!("{}", short_sha(&outcome.head).style(self.ctx.styles.sha)),
        );
        let source = if outcome.cloned() { "cloned" } else { "synced" };
        self.ctx.kv("Source:  ", source);
        self.ctx.kv(
            "Elapsed: ",
            &format_duration_ms(total_duration_ms(&outcome.steps)),
        );
        println!();
        self.ctx.header("Steps:");
        for record in &outcome.steps {
            println!("  {}", format_step_line(record));
        }
    }

    /// Render the state of a remote checkout.
    pub fn render_status(&self, checkout: &str, branch: &str, status: &CheckoutStatus) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.kv("Checkout:", checkout);
        match status {
            CheckoutStatus::Absent => {
                self.ctx.warn("Not checked out; the next deploy will clone it");
            }
            CheckoutStatus::Present {
                branch: current,
                head,
                upstream,
            } => {
                self.ctx.kv("Branch:  ", current);
                self.ctx.kv(
                    "HEAD:    ",
                    &format!("{}", short_sha(head).style(self.ctx.styles.sha)),
                );
                match upstream {
                    Some(upstream) if upstream == head => {
                        self.ctx.success(&format!("HEAD matches origin/{branch}"));
                    }
                    Some(upstream) => self.ctx.warn(&format!(
                        "origin/{branch} is at {}",
                        short_sha(upstream)
                    )),
                    None => self.ctx.info(&format!("origin/{branch} not fetched yet")),
                }
                if current != branch {
                    self.ctx.warn(&format!("On {current}, expected {branch}"));
                }
            }
        }
    }

    /// Render the effective configuration.
    pub fn render_config(&self, config: &DeployerConfig, path: &Path) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.header("Configuration");
        self.ctx.kv("File:", &path.display().to_string());
        println!();
        let width = config
            .entries()
            .iter()
            .map(|(k, _)| k.len())
            .max()
            .unwrap_or(0);
        for (key, value) in config.entries() {
            self.ctx.kv(&format!("{key:<width$}"), &value);
        }
    }
}

/// First 12 characters of a commit id.
#[must_use]
pub fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}

/// `1.2s`, `850ms`, `2m 05s`.
#[must_use]
pub fn format_duration_ms(ms: u64) -> String {
    match ms {
        0..1_000 => format!("{ms}ms"),
        1_000..60_000 => format!("{}.{}s", ms / 1_000, (ms % 1_000) / 100),
        _ => format!("{}m {:02}s", ms / 60_000, (ms % 60_000) / 1_000),
    }
}

/// `[3] fetch  1.2s`
#[must_use]
pub fn format_step_line(record: &StepRecord) -> String {
    format!(
        "[{}] {:<12} {}",
        record.number,
        record.step.as_str(),
        format_duration_ms(record.duration_ms)
    )
}

fn total_duration_ms(steps: &[StepRecord]) -> u64 {
    steps.iter().map(|r| r.duration_ms).sum()
}
