//! `deployer status`: show the state of a project's remote checkout.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::status::checkout_status;
use crate::domain::RemoteHost;
use crate::domain::request::{validate_branch, validate_project};
use crate::output::progress;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Project (repository) name
    #[arg(long, env = "DEPLOY_PROJECT")]
    pub project: String,

    /// Branch expected to be deployed
    #[arg(long, env = "DEPLOY_BRANCH", default_value = "main")]
    pub branch: String,

    /// Target host: [user@]host[:port]
    #[arg(long, env = "DEPLOY_HOST")]
    pub host: String,
}

/// Run the status command. Read-only; no git token is needed.
///
/// # Errors
///
/// Returns an error if inputs are invalid or the remote query fails.
pub async fn run(app: &AppContext, args: &StatusArgs) -> Result<ExitCode> {
    validate_project(&args.project)?;
    validate_branch(&args.branch)?;
    let host = RemoteHost::parse(&args.host)?;

    let config = app.config_store.load()?;
    let identity = app.secrets.ssh_identity()?;
    let shell = super::remote_shell(&config, &host, identity.as_ref());
    let layout = config.layout(&args.project);

    let pb = progress::spinner_if(app.output.show_progress(), "Querying remote checkout...");
    let status = checkout_status(
        &shell,
        &layout,
        &args.branch,
        Duration::from_secs(config.timeouts.step_secs),
    )
    .await;
    progress::finish_clear(&pb);
    let status = status?;

    app.renderer().render_status(
        &args.project,
        &args.branch,
        &host.destination(&config.remote.user),
        &layout.checkout,
        &status,
    )?;
    Ok(ExitCode::SUCCESS)
}
