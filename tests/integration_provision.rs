//! End-to-end scenarios for the provisioning plan.
//!
//! These tests drive the public API with a scripted runner so no real
//! installers execute. The fake replays one canned output containing every
//! success marker, which makes any step pass unless the test injects a
//! failure for a specific command line.

use async_trait::async_trait;
use q2_provision::plan::steps;
use q2_provision::{
    classify, provision, CleanupManager, ExecutionOutcome, Phase, ProcessRunner, ProvisionContext,
    ProvisionError, Reporter, SystemRunner, Verdict,
};
use std::sync::Mutex;

/// Canned output containing every success marker in the plan, plus a Python
/// version that does not match the plugin-registration gate.
const ALL_MARKERS: &str = "saved\n\
installation finished.\n\
mamba\n\
Executing transaction: ...working... done\n\
Successfully installed empress-1.2.0\n\
SIGNAL received\n\
QIIME 2 release: 2023.2\n\
Usage: prefetch [options]\n\
Python 3.11.0\n";

/// Scripted [`ProcessRunner`]: records every command line with its overlay
/// and fails the first command containing `fail_matching`.
struct FakeRunner {
    canned_output: String,
    fail_matching: Option<&'static str>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeRunner {
    fn passing() -> Self {
        Self {
            canned_output: ALL_MARKERS.to_string(),
            fail_matching: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Like [`passing`](Self::passing), but the interpreter reports the
    /// version the plugin-registration gate targets.
    fn passing_with_python_38() -> Self {
        Self {
            canned_output: ALL_MARKERS.replace("Python 3.11.0", "Python 3.8.16"),
            ..Self::passing()
        }
    }

    fn failing_on(pattern: &'static str) -> Self {
        Self {
            fail_matching: Some(pattern),
            ..Self::passing()
        }
    }

    /// Recorded step command lines, excluding the Python gate probe.
    fn step_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(line, _)| !line.starts_with("python3 --version"))
            .map(|(line, _)| line.clone())
            .collect()
    }

    /// Overlays recorded for every call whose command line starts with
    /// `prefix`.
    fn overlays_for(&self, prefix: &str) -> Vec<Vec<(String, String)>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(line, _)| line.starts_with(prefix))
            .map(|(_, overlay)| overlay.clone())
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        env_overlay: &[(String, String)],
    ) -> Result<ExecutionOutcome, ProvisionError> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls
            .lock()
            .unwrap()
            .push((line.clone(), env_overlay.to_vec()));

        if let Some(pattern) = self.fail_matching {
            if line.contains(pattern) {
                return Ok(ExecutionOutcome {
                    combined_output: "simulated failure".to_string(),
                    exit_code: 1,
                });
            }
        }
        Ok(ExecutionOutcome {
            combined_output: self.canned_output.clone(),
            exit_code: 0,
        })
    }
}

/// Records reporting calls so scenarios can assert on cleanup counts and
/// final messages.
#[derive(Default)]
struct RecordingReporter {
    cleanups: Mutex<u32>,
    failures: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
}

impl Reporter for RecordingReporter {
    fn progress(&self, phase: Phase, _message: &str) {
        if phase == Phase::Cleanup {
            *self.cleanups.lock().unwrap() += 1;
        }
    }
    fn success(&self, _phase: Phase, _message: &str) {}
    fn failure(&self, message: &str, _diagnostic: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
    fn finished(&self, message: &str) {
        self.finished.lock().unwrap().push(message.to_string());
    }
}

/// Command lines of the full fresh-machine plan, in order, without the
/// gated plugin-registration block.
fn full_plan_command_lines() -> Vec<String> {
    steps::runtime_steps()
        .iter()
        .chain(steps::package_manager_steps().iter())
        .chain(steps::toolkit_steps().iter())
        .chain(steps::verify_steps().iter())
        .map(|s| s.command_line())
        .collect()
}

fn empty_cleanup() -> CleanupManager {
    CleanupManager::with_artifacts(Vec::new())
}

#[tokio::test]
async fn test_scenario_a_fresh_machine_runs_all_steps_in_order() {
    let runner = FakeRunner::passing();
    let reporter = RecordingReporter::default();
    let ctx = ProvisionContext {
        runtime_present: false,
        toolkit_present: false,
    };

    let result = provision(&runner, &reporter, ctx, &empty_cleanup()).await;

    assert!(result.is_ok());
    assert_eq!(runner.step_calls(), full_plan_command_lines());
    assert_eq!(*reporter.cleanups.lock().unwrap(), 1);
    assert_eq!(reporter.finished.lock().unwrap().len(), 1);
    assert!(reporter.failures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_scenario_a_failure_halts_before_subsequent_steps() {
    let runner = FakeRunner::failing_on("pip install redbiom");
    let reporter = RecordingReporter::default();
    let ctx = ProvisionContext {
        runtime_present: false,
        toolkit_present: false,
    };

    let result = provision(&runner, &reporter, ctx, &empty_cleanup()).await;

    match result {
        Err(ProvisionError::StepFailed { command, .. }) => {
            assert_eq!(command, "pip install redbiom");
        }
        other => panic!("expected a step failure, got {other:?}"),
    }

    // Everything up to and including the failing step ran; nothing after.
    let expected: Vec<String> = full_plan_command_lines()
        .into_iter()
        .take_while(|line| line != "pip install redbiom")
        .chain(std::iter::once("pip install redbiom".to_string()))
        .collect();
    assert_eq!(runner.step_calls(), expected);

    // Cleanup exactly once, one failure report, no success confirmation.
    assert_eq!(*reporter.cleanups.lock().unwrap(), 1);
    assert_eq!(reporter.failures.lock().unwrap().len(), 1);
    assert!(reporter.finished.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_scenario_a_first_step_failure_runs_nothing_else() {
    let runner = FakeRunner::failing_on("wget");
    let reporter = RecordingReporter::default();
    let ctx = ProvisionContext {
        runtime_present: false,
        toolkit_present: false,
    };

    let result = provision(&runner, &reporter, ctx, &empty_cleanup()).await;

    assert!(result.is_err());
    assert_eq!(runner.step_calls().len(), 1);
    assert_eq!(*reporter.cleanups.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_scenario_b_everything_present_runs_only_verification() {
    let runner = FakeRunner::passing();
    let reporter = RecordingReporter::default();
    let ctx = ProvisionContext {
        runtime_present: true,
        toolkit_present: true,
    };

    let result = provision(&runner, &reporter, ctx, &empty_cleanup()).await;

    assert!(result.is_ok());
    assert_eq!(
        runner.step_calls(),
        vec!["qiime info".to_string(), "prefetch --help".to_string()]
    );
    assert_eq!(*reporter.cleanups.lock().unwrap(), 1);
    assert_eq!(reporter.finished.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_python_38_gate_runs_plugin_registration_after_verification() {
    let runner = FakeRunner::passing_with_python_38();
    let reporter = RecordingReporter::default();
    let ctx = ProvisionContext {
        runtime_present: true,
        toolkit_present: true,
    };

    let result = provision(&runner, &reporter, ctx, &empty_cleanup()).await;

    assert!(result.is_ok());

    // Verification first, then the two registration steps, each exactly once.
    let mut expected: Vec<String> = steps::verify_steps()
        .iter()
        .map(|s| s.command_line())
        .collect();
    expected.extend(
        steps::plugin_registration_steps()
            .iter()
            .map(|s| s.command_line()),
    );
    assert_eq!(runner.step_calls(), expected);

    // Both interpreter invocations carry the site-packages overlay.
    let overlays = runner.overlays_for("python3 -c");
    assert_eq!(overlays.len(), 2);
    for overlay in overlays {
        assert_eq!(
            overlay,
            vec![("PYTHONPATH".to_string(), steps::SITE_PACKAGES.to_string())]
        );
    }

    assert_eq!(*reporter.cleanups.lock().unwrap(), 1);
    assert_eq!(reporter.finished.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_matching_python_skips_plugin_registration() {
    let runner = FakeRunner::passing();
    let reporter = RecordingReporter::default();
    let ctx = ProvisionContext {
        runtime_present: true,
        toolkit_present: true,
    };

    let result = provision(&runner, &reporter, ctx, &empty_cleanup()).await;

    assert!(result.is_ok());
    assert!(runner
        .step_calls()
        .iter()
        .all(|line| !line.starts_with("python3 -c")));
}

#[tokio::test]
async fn test_runtime_present_still_installs_toolkit_and_verifies() {
    let runner = FakeRunner::passing();
    let reporter = RecordingReporter::default();
    let ctx = ProvisionContext {
        runtime_present: true,
        toolkit_present: false,
    };

    let result = provision(&runner, &reporter, ctx, &empty_cleanup()).await;

    assert!(result.is_ok());
    let calls = runner.step_calls();
    // No runtime block...
    assert!(calls.iter().all(|line| !line.starts_with("wget")));
    assert!(calls.iter().all(|line| !line.starts_with("bash")));
    // ...but the package-manager layer, toolkit, and verification all ran.
    assert!(calls.iter().any(|line| line.starts_with("conda install mamba")));
    assert!(calls.iter().any(|line| line.starts_with("mamba install")));
    assert_eq!(calls.last().unwrap(), "prefetch --help");
}

#[tokio::test]
async fn test_verification_failure_is_fatal_even_when_installs_skipped() {
    let runner = FakeRunner::failing_on("qiime info");
    let reporter = RecordingReporter::default();
    let ctx = ProvisionContext {
        runtime_present: true,
        toolkit_present: true,
    };

    let result = provision(&runner, &reporter, ctx, &empty_cleanup()).await;

    assert!(result.is_err());
    assert_eq!(runner.step_calls(), vec!["qiime info".to_string()]);
    assert_eq!(*reporter.cleanups.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_cleanup_removes_artifacts_on_failure_path() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("Miniconda3-installer.sh");
    std::fs::write(&artifact, "#!/bin/sh").unwrap();

    let runner = FakeRunner::failing_on("wget");
    let reporter = RecordingReporter::default();
    let cleanup = CleanupManager::with_artifacts(vec![artifact.clone()]);
    let ctx = ProvisionContext {
        runtime_present: false,
        toolkit_present: false,
    };

    let result = provision(&runner, &reporter, ctx, &cleanup).await;

    assert!(result.is_err());
    assert!(!artifact.exists());
}

#[test]
fn test_classifier_correctness_table() {
    let finished = ExecutionOutcome {
        combined_output: "installation finished.".to_string(),
        exit_code: 0,
    };
    assert_eq!(classify(&finished, "installation finished.", true), Verdict::Pass);

    let finished_nonzero = ExecutionOutcome {
        combined_output: "installation finished.".to_string(),
        exit_code: 1,
    };
    assert_eq!(
        classify(&finished_nonzero, "installation finished.", true),
        Verdict::Fail
    );

    let signaled = ExecutionOutcome {
        combined_output: "SIGNAL received".to_string(),
        exit_code: 1,
    };
    assert_eq!(classify(&signaled, "SIGNAL", false), Verdict::Pass);
}

#[tokio::test]
async fn test_environment_overlay_reaches_real_commands() {
    std::env::set_var("Q2_INTEGRATION_OVERLAY", "ambient");
    let outcome = SystemRunner
        .run(
            "sh",
            &["-c".to_string(), "printf %s \"$Q2_INTEGRATION_OVERLAY\"".to_string()],
            &[("Q2_INTEGRATION_OVERLAY".to_string(), "overlay".to_string())],
        )
        .await
        .unwrap();
    assert_eq!(outcome.combined_output, "overlay");
}
