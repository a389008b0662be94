//! Data records consumed by the step engine.
//!
//! A [`StepSpec`] describes one provisioning action as data: the command to
//! run, how to recognize success in its output, and the messages shown to
//! the user around it. An [`ExecutionOutcome`] is the captured result of
//! running one such command, immutable after creation and discarded once the
//! pass/fail decision is made.

use crate::report::Phase;
use serde::{Deserialize, Serialize};

/// A single provisioning step.
///
/// Steps are constructed by the plan tables and consumed immediately by the
/// driver; none are stored or replayed. Every step is fatal: there is no
/// soft-failure mode.
///
/// # Example
///
/// ```rust
/// use q2_provision::{Phase, StepSpec};
///
/// let step = StepSpec::new(
///     Phase::Install,
///     "vdb-config",
///     &["--interactive"],
///     "SIGNAL",
///     "Fixing SRA Tools configuration...",
///     "Could not configure SRA Tools.",
///     "SRA Tools configured.",
/// )
/// .with_env("CONDA_PREFIX", "/usr/local")
/// .tolerate_nonzero_exit();
///
/// assert!(!step.require_zero_exit);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    /// Phase tag used for the console line prefix.
    pub phase: Phase,

    /// The program to execute.
    pub program: String,

    /// Arguments to pass to the program.
    pub args: Vec<String>,

    /// Environment variables layered over the inherited environment.
    /// Overlay keys win; every other inherited variable passes through.
    pub env_overlay: Vec<(String, String)>,

    /// Substring whose presence in the combined output signals success.
    ///
    /// Empty only for steps with "ran without throwing" semantics; an empty
    /// marker matches trivially and the exit code alone decides.
    pub success_marker: String,

    /// Line emitted before the command runs.
    pub progress_message: String,

    /// Line emitted when the step fails.
    pub failure_message: String,

    /// Line emitted when the step passes.
    pub success_message: String,

    /// When true, success additionally requires a zero exit code.
    pub require_zero_exit: bool,
}

impl StepSpec {
    /// Build a step with the strict exit-code policy and no overlay.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        phase: Phase,
        program: &str,
        args: &[&str],
        success_marker: &str,
        progress_message: &str,
        failure_message: &str,
        success_message: &str,
    ) -> Self {
        Self {
            phase,
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env_overlay: Vec::new(),
            success_marker: success_marker.to_string(),
            progress_message: progress_message.to_string(),
            failure_message: failure_message.to_string(),
            success_message: success_message.to_string(),
            require_zero_exit: true,
        }
    }

    /// Add an environment variable to the overlay.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env_overlay.push((key.to_string(), value.to_string()));
        self
    }

    /// Accept a non-zero exit code as long as the success marker appears.
    ///
    /// Exists for tools that exit non-zero on success yet leave correct
    /// side-effect state behind.
    pub fn tolerate_nonzero_exit(mut self) -> Self {
        self.require_zero_exit = false;
        self
    }

    /// The full command line, for error payloads and log events.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of running one external command.
///
/// `combined_output` is all of stdout followed by all of stderr; the
/// concatenation order is load-bearing for marker matching and must not be
/// changed to interleaving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// stdout followed by stderr, lossily decoded.
    pub combined_output: String,
    /// Exit code of the child (-1 if terminated by a signal).
    pub exit_code: i32,
}
