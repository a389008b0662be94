//! The fixed provisioning plan and its driver.
//!
//! [`steps`] holds the ordered step tables as data; [`provision`] consumes
//! them with one generic execute-in-order, stop-at-first-failure loop and
//! guarantees the [`CleanupManager`] runs exactly once per run.

mod cleanup;
mod driver;
pub mod steps;

pub use cleanup::CleanupManager;
pub use driver::provision;
