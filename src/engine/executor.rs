//! Step execution: run one step, report, and decide pass or fail.

use crate::engine::classify::{classify, Verdict};
use crate::engine::runner::ProcessRunner;
use crate::engine::types::StepSpec;
use crate::errors::ProvisionError;
use crate::report::Reporter;
use tracing::debug;

/// Execute one step end to end.
///
/// Emits the step's progress message, runs its command, classifies the
/// captured outcome, and emits the success message on pass. On fail, the
/// failure message and the raw captured output are reported for diagnosis
/// and the error is returned to the caller; the driver above owns cleanup
/// and the exit code. There is no soft-failure mode — every step is fatal.
///
/// # Example
///
/// ```rust,no_run
/// use q2_provision::{execute_step, ConsoleReporter, Phase, StepSpec, SystemRunner};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), q2_provision::ProvisionError> {
/// let step = StepSpec::new(
///     Phase::Verify,
///     "qiime",
///     &["info"],
///     "QIIME 2 release:",
///     "Checking that the QIIME 2 command line works...",
///     "The QIIME 2 command line does not seem to work.",
///     "The QIIME 2 command line looks good.",
/// );
/// execute_step(&SystemRunner, &ConsoleReporter, &step).await?;
/// # Ok(())
/// # }
/// ```
pub async fn execute_step<R>(
    runner: &R,
    reporter: &dyn Reporter,
    step: &StepSpec,
) -> Result<(), ProvisionError>
where
    R: ProcessRunner + ?Sized,
{
    reporter.progress(step.phase, &step.progress_message);
    debug!(command = %step.command_line(), phase = step.phase.label(), "running step");

    let outcome = match runner.run(&step.program, &step.args, &step.env_overlay).await {
        Ok(outcome) => outcome,
        Err(err) => {
            reporter.failure(&step.failure_message, &err.to_string());
            return Err(err);
        }
    };

    match classify(&outcome, &step.success_marker, step.require_zero_exit) {
        Verdict::Pass => {
            debug!(command = %step.command_line(), "step passed");
            reporter.success(step.phase, &step.success_message);
            Ok(())
        }
        Verdict::Fail => {
            debug!(
                command = %step.command_line(),
                exit_code = outcome.exit_code,
                "step failed"
            );
            reporter.failure(&step.failure_message, &outcome.combined_output);
            Err(ProvisionError::StepFailed {
                command: step.command_line(),
                exit_code: outcome.exit_code,
                output: outcome.combined_output,
            })
        }
    }
}
