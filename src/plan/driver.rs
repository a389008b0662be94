//! The plan driver: execute the fixed step sequence, stop at the first
//! failure, and guarantee cleanup runs exactly once.

use crate::engine::{execute_step, ProcessRunner, StepSpec};
use crate::errors::ProvisionError;
use crate::plan::cleanup::CleanupManager;
use crate::plan::steps;
use crate::preflight::{python_gate_matches, ProvisionContext};
use crate::report::{Phase, Reporter};
use tracing::info;

/// Python version the plugin-registration block targets; the installed
/// site-packages tree is built for this interpreter.
const PLUGIN_GATE_PYTHON: (u32, u32) = (3, 8);

/// Final confirmation line on full success.
const ALL_OK_MESSAGE: &str = "Everything is A-OK. You can start using QIIME 2 now.";

/// Run the full provisioning plan, then clean up.
///
/// Cleanup runs exactly once whether the plan passed or failed. On success
/// the final green confirmation is emitted and `Ok(())` returned; on failure
/// the first error is returned after cleanup, and the caller maps it to a
/// non-zero exit code. Failure handling never terminates the process from
/// inside the engine.
///
/// # Example
///
/// ```rust,no_run
/// use q2_provision::{preflight, provision, CleanupManager, ConsoleReporter, SystemRunner};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> std::process::ExitCode {
///     let runner = SystemRunner;
///     let reporter = ConsoleReporter;
///     let ctx = preflight(&runner).await;
///     match provision(&runner, &reporter, ctx, &CleanupManager::new()).await {
///         Ok(()) => std::process::ExitCode::SUCCESS,
///         Err(_) => std::process::ExitCode::from(1),
///     }
/// }
/// ```
pub async fn provision<R>(
    runner: &R,
    reporter: &dyn Reporter,
    ctx: ProvisionContext,
    cleanup: &CleanupManager,
) -> Result<(), ProvisionError>
where
    R: ProcessRunner + ?Sized,
{
    let result = run_plan(runner, reporter, ctx).await;
    cleanup.run(reporter);

    match result {
        Ok(()) => {
            reporter.finished(ALL_OK_MESSAGE);
            info!("provisioning finished");
            Ok(())
        }
        Err(err) => {
            info!(error = %err, "provisioning failed");
            Err(err)
        }
    }
}

/// Execute the plan blocks in their fixed order.
///
/// The order encodes real dependency constraints and must not change: the
/// runtime before the package-manager layer, that layer before the toolkit,
/// installs before verification. Verification always runs, even when both
/// install blocks were skipped.
async fn run_plan<R>(
    runner: &R,
    reporter: &dyn Reporter,
    ctx: ProvisionContext,
) -> Result<(), ProvisionError>
where
    R: ProcessRunner + ?Sized,
{
    if ctx.runtime_present {
        reporter.progress(Phase::Install, "Miniconda is already installed. Skipped.");
    } else {
        execute_all(runner, reporter, &steps::runtime_steps()).await?;
    }

    if ctx.toolkit_present {
        reporter.progress(Phase::Install, "QIIME 2 is already installed. Skipped.");
    } else {
        execute_all(runner, reporter, &steps::package_manager_steps()).await?;
        execute_all(runner, reporter, &steps::toolkit_steps()).await?;
    }

    execute_all(runner, reporter, &steps::verify_steps()).await?;

    if python_gate_matches(runner, PLUGIN_GATE_PYTHON.0, PLUGIN_GATE_PYTHON.1).await {
        execute_all(runner, reporter, &steps::plugin_registration_steps()).await?;
    }

    Ok(())
}

/// Execute every step of one block in order, stopping at the first failure.
async fn execute_all<R>(
    runner: &R,
    reporter: &dyn Reporter,
    block: &[StepSpec],
) -> Result<(), ProvisionError>
where
    R: ProcessRunner + ?Sized,
{
    for step in block {
        execute_step(runner, reporter, step).await?;
    }
    Ok(())
}
