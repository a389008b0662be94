//! # q2-provision
//!
//! Environment bootstrapping for the QIIME 2 amplicon-analysis toolchain on
//! disposable compute sessions. Do not run this on a machine you care
//! about: it installs a Miniconda tree under `/usr/local`.
//!
//! The core is a small step-sequencing and verification engine: external
//! installation commands run in a fixed dependency order, each outcome is
//! classified as pass or fail by matching a success marker in the captured
//! output (not just the exit code), and the first failure stops the run
//! after a guaranteed cleanup of downloaded installer artifacts.
//!
//! ## Structure
//!
//! - [`engine`] — process runner, outcome classifier, and step executor
//! - [`preflight`] — best-effort "already installed" probes
//! - [`plan`] — the fixed step tables, the driver, and the cleanup manager
//! - [`report`] — the explicit progress-reporting interface
//!
//! ## Example
//!
//! ```rust,no_run
//! use q2_provision::{preflight, provision, CleanupManager, ConsoleReporter, SystemRunner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> std::process::ExitCode {
//!     let runner = SystemRunner;
//!     let reporter = ConsoleReporter;
//!     let ctx = preflight(&runner).await;
//!     match provision(&runner, &reporter, ctx, &CleanupManager::new()).await {
//!         Ok(()) => std::process::ExitCode::SUCCESS,
//!         Err(_) => std::process::ExitCode::from(1),
//!     }
//! }
//! ```

pub mod engine;
mod errors;
pub mod plan;
pub mod preflight;
pub mod report;

pub use engine::{
    classify, execute_step, ExecutionOutcome, ProcessRunner, StepSpec, SystemRunner, Verdict,
};
pub use errors::ProvisionError;
pub use plan::{provision, CleanupManager};
pub use preflight::{preflight, probe, ProvisionContext};
pub use report::{ConsoleReporter, Phase, Reporter};
