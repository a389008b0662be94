//! Pass/fail classification of captured command output.

use crate::engine::types::ExecutionOutcome;

/// The classifier's decision for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The step met its success criteria.
    Pass,
    /// The step did not; the run must stop.
    Fail,
}

/// Decide whether an outcome counts as success.
///
/// With `require_zero_exit` set, success requires a zero exit code *and* the
/// marker appearing in the combined output. Without it, the marker alone
/// decides and the exit code is ignored — some tools exit non-zero on
/// success due to known quirks, and the flag whitelists that per step.
///
/// An empty marker matches trivially, so such steps are judged on exit code
/// alone ("ran without throwing" semantics).
///
/// # Example
///
/// ```rust
/// use q2_provision::{classify, ExecutionOutcome, Verdict};
///
/// let outcome = ExecutionOutcome {
///     combined_output: "SIGNAL received".to_string(),
///     exit_code: 1,
/// };
/// assert_eq!(classify(&outcome, "SIGNAL", false), Verdict::Pass);
/// assert_eq!(classify(&outcome, "SIGNAL", true), Verdict::Fail);
/// ```
pub fn classify(
    outcome: &ExecutionOutcome,
    success_marker: &str,
    require_zero_exit: bool,
) -> Verdict {
    let marker_found = outcome.combined_output.contains(success_marker);
    let passed = if require_zero_exit {
        outcome.exit_code == 0 && marker_found
    } else {
        marker_found
    };
    if passed {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}
