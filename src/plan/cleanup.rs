//! Removal of transient installer artifacts.

use crate::report::{Phase, Reporter};
use std::path::PathBuf;
use tracing::debug;

/// Deletes the transient artifacts a run may have downloaded.
///
/// Idempotent by construction: missing files are not errors, and repeated
/// calls leave the filesystem in the same state as a single call. The driver
/// invokes it exactly once per run, on both the failure and the
/// normal-completion path.
///
/// # Example
///
/// ```rust
/// use q2_provision::{CleanupManager, ConsoleReporter};
///
/// let cleanup = CleanupManager::new();
/// cleanup.run(&ConsoleReporter);
/// cleanup.run(&ConsoleReporter); // safe to call again
/// ```
#[derive(Debug, Clone)]
pub struct CleanupManager {
    artifacts: Vec<PathBuf>,
}

impl Default for CleanupManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanupManager {
    /// Manager for the fixed artifact set of the standard plan.
    pub fn new() -> Self {
        Self::with_artifacts(vec![
            PathBuf::from(super::steps::MINICONDA_INSTALLER),
            PathBuf::from(super::steps::SRA_TOOLS_INSTALLER),
        ])
    }

    /// Manager over an explicit artifact list.
    pub fn with_artifacts(artifacts: Vec<PathBuf>) -> Self {
        Self { artifacts }
    }

    /// Delete whichever artifacts currently exist.
    pub fn run(&self, reporter: &dyn Reporter) {
        for path in &self.artifacts {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed artifact"),
                // Best effort only; a stuck artifact must not turn cleanup
                // into another failure.
                Err(err) => debug!(path = %path.display(), error = %err, "could not remove artifact"),
            }
        }
        reporter.progress(Phase::Cleanup, "Cleaned up unneeded files.");
    }
}
