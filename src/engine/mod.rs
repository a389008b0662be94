//! The step-sequencing and verification engine.
//!
//! Three pieces compose into "run a named step":
//!
//! - [`ProcessRunner`] executes an external command and captures its
//!   combined output and exit status.
//! - [`classify`] turns a captured outcome into a pass/fail [`Verdict`]
//!   using a success-marker substring and an exit-code policy flag.
//! - [`execute_step`] binds the two together with user-facing reporting.

mod classify;
mod executor;
mod runner;
mod types;

pub use classify::{classify, Verdict};
pub use executor::execute_step;
pub use runner::{ProcessRunner, SystemRunner};
pub use types::{ExecutionOutcome, StepSpec};
