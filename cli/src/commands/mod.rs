//! Command implementations

pub mod config;
pub mod deploy;
pub mod status;
pub mod version;

use std::time::Duration;

use crate::domain::{DeployerConfig, RemoteHost};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::secrets::SshIdentity;
use crate::infra::ssh::{SshRemoteShell, SshTarget};

/// SSH shell for `host` under `config`.
fn remote_shell(
    config: &DeployerConfig,
    host: &RemoteHost,
    identity: Option<&SshIdentity>,
) -> SshRemoteShell<TokioCommandRunner> {
    let target = SshTarget::new(
        host,
        &config.remote.user,
        identity.map(|i| i.path().to_path_buf()),
        &config.ssh,
    );
    SshRemoteShell::new(
        TokioCommandRunner::new(Duration::from_secs(config.timeouts.step_secs)),
        target,
    )
}
