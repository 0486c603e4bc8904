//! `deployer deploy`: ensure a project is deployed at a branch tip.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{ConfigStore, SecretSource};
use crate::application::services::deploy::{DeploySettings, deploy_with_deadline};
use crate::domain::DeploymentRequest;

/// Arguments for the deploy command.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Project (repository) name
    #[arg(long, env = "DEPLOY_PROJECT")]
    pub project: String,

    /// Branch to deploy
    #[arg(long, env = "DEPLOY_BRANCH", default_value = "main")]
    pub branch: String,

    /// Target host: [user@]host[:port]
    #[arg(long, env = "DEPLOY_HOST")]
    pub host: String,

    /// Overall time limit in minutes [default: timeouts.run_mins]
    #[arg(long, value_name = "MINUTES", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if inputs or secrets are invalid, or any deploy step fails.
pub async fn run(app: &AppContext, args: &DeployArgs) -> Result<ExitCode> {
    let config = app.config_store.load()?;
    let token = app.secrets.git_token()?;
    let request = DeploymentRequest::new(&args.project, &args.branch, &args.host, token)?;

    // Held until the run ends so an ephemeral key file outlives every ssh session.
    let identity = app.secrets.ssh_identity()?;
    let shell = super::remote_shell(&config, request.remote_host(), identity.as_ref());
    shell.preflight().await?;

    let settings = DeploySettings {
        layout: config.layout(request.project()),
        source_host: config.source.host.clone(),
        on_divergence: config.sync.on_divergence,
        step_timeout: Duration::from_secs(config.timeouts.step_secs),
    };
    let run_mins = args.timeout.unwrap_or(config.timeouts.run_mins);
    let run_timeout = Duration::from_secs(run_mins.saturating_mul(60));

    let outcome =
        deploy_with_deadline(&shell, &app.reporter(), &request, &settings, run_timeout).await?;
    app.renderer().render_outcome(&outcome)?;
    drop(identity);
    Ok(ExitCode::SUCCESS)
}
