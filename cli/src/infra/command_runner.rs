//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Child;

use crate::application::ports::CommandRunner;
use crate::domain::CommandTimedOut;

/// Default timeout for short local commands (`ssh -V` and similar).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Production `CommandRunner` using tokio for async process execution
/// with guaranteed timeout and kill.
///
/// `tokio::time::timeout` around `.output().await` only drops the future;
/// this implementation uses `tokio::select!` with an explicit `child.kill()`
/// so an ssh session that hangs is terminated.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, ?args, "spawning");
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        wait_with_timeout(child, program, None, timeout).await
    }

    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        input: &[u8],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, ?args, stdin_bytes = input.len(), "spawning");
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        wait_with_timeout(child, program, Some(input.to_vec()), timeout).await
    }
}

/// Feed `input`, drain stdout/stderr, and wait, killing the child on timeout.
async fn wait_with_timeout(
    mut child: Child,
    program: &str,
    input: Option<Vec<u8>>,
    timeout: Duration,
) -> Result<Output> {
    // Write stdin in a spawned task to avoid deadlock with stdout/stderr reads.
    // Dropping the handle at the end of the task closes the pipe (EOF).
    let stdin_handle = child.stdin.take();
    let stdin_task = tokio::spawn(async move {
        if let (Some(mut stdin), Some(input)) = (stdin_handle, input) {
            let _ = stdin.write_all(&input).await;
        }
    });

    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();

    // Read stdout/stderr CONCURRENTLY with wait() to avoid pipe deadlock.
    // If the child writes more than the OS pipe buffer it blocks on write,
    // and wait() alone would never resolve.
    tokio::select! {
        result = async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stdout_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stderr_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
            );
            let _ = stdin_task.await;
            Ok(Output {
                status: status.with_context(|| format!("waiting for {program}"))?,
                stdout,
                stderr,
            })
        } => result,
        () = tokio::time::sleep(timeout) => {
            let _ = child.kill().await;
            Err(CommandTimedOut {
                program: program.to_string(),
                secs: timeout.as_secs(),
            }
            .into())
        }
    }
}
