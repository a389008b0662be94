//! External command execution.

use crate::engine::types::ExecutionOutcome;
use crate::errors::ProvisionError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs external commands for the step executor and the preflight detector.
///
/// The trait exists so the executor and plan driver can be exercised against
/// a scripted implementation in tests; production code uses [`SystemRunner`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` and the overlay merged on top of the
    /// inherited environment, blocking until the child exits.
    ///
    /// Returns the captured [`ExecutionOutcome`], or
    /// [`ProvisionError::Launch`] if the child could not be spawned at all.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        env_overlay: &[(String, String)],
    ) -> Result<ExecutionOutcome, ProvisionError>;
}

/// [`ProcessRunner`] backed by real child processes.
///
/// Captures stdout and stderr separately and concatenates them with stdout
/// first; interleaving is deliberately not preserved, and downstream marker
/// matching assumes this order. There are no retries and no timeout: a hung
/// installer hangs the run, per the concurrency model.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        env_overlay: &[(String, String)],
    ) -> Result<ExecutionOutcome, ProvisionError> {
        debug!(program, ?args, "spawning command");

        let output = Command::new(program)
            .args(args)
            .envs(env_overlay.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ProvisionError::Launch {
                program: program.to_string(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        // A signal-terminated child has no exit code; -1 keeps strict steps
        // failing while still giving the classifier an integer.
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(program, exit_code, "command finished");
        Ok(ExecutionOutcome {
            combined_output: combined,
            exit_code,
        })
    }
}
