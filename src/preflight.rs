//! Best-effort detection of already-installed components.
//!
//! Before any step runs, the plan driver asks whether Miniconda and QIIME 2
//! are already present so the corresponding install blocks can be skipped.
//! Detection is tolerant by design: a probe that is not on PATH, fails to
//! launch, exits non-zero, or times out simply counts as "not present".
//! Verification steps at the end of the plan always run regardless, so a
//! previously broken but "detected" install is still caught.

use crate::engine::ProcessRunner;
use regex::Regex;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Timeout for read-only diagnostic probes.
///
/// Install steps are never time-limited; probes are, so a wedged diagnostic
/// command cannot stall preflight.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Preflight flags gating the two skippable install blocks.
///
/// Computed once at the start of a run and passed explicitly through the
/// plan driver; there is no process-global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionContext {
    /// `conda info` reported a conda version.
    pub runtime_present: bool,
    /// `qiime info` reported a QIIME 2 release.
    pub toolkit_present: bool,
}

/// Run a read-only diagnostic command and report whether `marker` occurs in
/// its output, regardless of exit code.
///
/// # Example
///
/// ```rust
/// use q2_provision::{probe, SystemRunner};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let present = probe(&SystemRunner, "conda", &["info".to_string()], "conda version").await;
///     println!("conda present: {present}");
/// }
/// ```
pub async fn probe<R>(runner: &R, program: &str, args: &[String], marker: &str) -> bool
where
    R: ProcessRunner + ?Sized,
{
    // Absent executable: skip the spawn entirely.
    if which::which(program).is_err() {
        debug!(program, "probe target not on PATH");
        return false;
    }

    match timeout(PROBE_TIMEOUT, runner.run(program, args, &[])).await {
        Ok(Ok(outcome)) => {
            let found = outcome.combined_output.contains(marker);
            debug!(program, found, "probe finished");
            found
        }
        Ok(Err(err)) => {
            debug!(program, error = %err, "probe could not run");
            false
        }
        Err(_) => {
            debug!(program, "probe timed out");
            false
        }
    }
}

/// Compute the preflight flags, probing conda and QIIME 2 concurrently.
///
/// The probes are read-only diagnostics, not plan steps, so running them
/// side by side does not violate the plan's strict step ordering.
pub async fn preflight<R>(runner: &R) -> ProvisionContext
where
    R: ProcessRunner + ?Sized,
{
    // The argument arrays must outlive the lazy futures borrowing them.
    let conda_args = ["info".to_string()];
    let qiime_args = ["info".to_string()];
    let conda = probe(runner, "conda", &conda_args, "conda version");
    let qiime = probe(runner, "qiime", &qiime_args, "QIIME 2 release:");
    let (runtime_present, toolkit_present) = futures::future::join(conda, qiime).await;

    debug!(runtime_present, toolkit_present, "preflight complete");
    ProvisionContext {
        runtime_present,
        toolkit_present,
    }
}

/// Whether the ambient Python interpreter matches `major.minor`.
///
/// Gates the plugin-registration block, which is only valid against the
/// interpreter version the installed site-packages tree was built for.
/// Evaluated after the install blocks, since the interpreter may only exist
/// once the runtime is installed.
pub async fn python_gate_matches<R>(runner: &R, major: u32, minor: u32) -> bool
where
    R: ProcessRunner + ?Sized,
{
    // A missing interpreter fails to launch and closes the gate; no PATH
    // pre-check, so the decision rests entirely on the runner.
    match timeout(PROBE_TIMEOUT, runner.run("python3", &["--version".to_string()], &[])).await {
        Ok(Ok(outcome)) => parse_python_version(&outcome.combined_output) == Some((major, minor)),
        Ok(Err(_)) | Err(_) => false,
    }
}

/// Extract `(major, minor)` from `python3 --version` style output.
fn parse_python_version(output: &str) -> Option<(u32, u32)> {
    let re = Regex::new(r"Python (\d+)\.(\d+)").ok()?;
    let caps = re.captures(output)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some((major, minor))
}
