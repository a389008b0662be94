//! Error types for a provisioning run.

use thiserror::Error;

/// Errors that end a provisioning run.
///
/// Every failure is fatal: the first error encountered stops the plan, the
/// cleanup manager runs, and the process exits non-zero. There is no retry
/// and no aggregation of multiple errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProvisionError {
    /// The external command could not be launched at all.
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        /// The program that could not be spawned.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A step ran to completion but did not meet its success criteria.
    #[error("step `{command}` failed (exit code {exit_code})")]
    StepFailed {
        /// The full command line of the failing step.
        command: String,
        /// Exit code of the child process (-1 if terminated by a signal).
        exit_code: i32,
        /// Raw combined output, kept for diagnosis.
        output: String,
    },
}
