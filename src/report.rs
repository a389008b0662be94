//! User-facing progress reporting.
//!
//! The provisioning run talks to the user through the [`Reporter`] trait,
//! which is passed explicitly through the plan driver and step executor.
//! Every console line carries a short iconographic prefix for the phase it
//! belongs to, and severity is colorized: informational lines are plain,
//! step successes blue, failures red, and the final confirmation green.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// The provisioning phase a console line belongs to.
///
/// # Example
///
/// ```rust
/// use q2_provision::Phase;
///
/// assert_eq!(Phase::Download.label(), "download");
/// assert_eq!(Phase::all().count(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum Phase {
    /// Fetching installer artifacts over the network.
    Download,
    /// Running an installer or package manager.
    Install,
    /// Post-install sanity checks.
    Verify,
    /// Removing transient artifacts.
    Cleanup,
}

impl Phase {
    /// Single-glyph prefix shown at the start of every console line.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Download => "⇣",
            Self::Install => "⚙",
            Self::Verify => "✔",
            Self::Cleanup => "♺",
        }
    }

    /// Lowercase phase name, used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Install => "install",
            Self::Verify => "verify",
            Self::Cleanup => "cleanup",
        }
    }

    /// Iterator over all phases.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}

/// Progress reporting interface for a provisioning run.
///
/// Implementations must be safe to share by reference across the driver and
/// the step executor. The crate ships [`ConsoleReporter`]; tests typically
/// substitute a recording implementation.
pub trait Reporter: Send + Sync {
    /// An informational line: a step is starting, or a block was skipped.
    fn progress(&self, phase: Phase, message: &str);

    /// A step passed.
    fn success(&self, phase: Phase, message: &str);

    /// A step failed. `diagnostic` carries the raw captured command output
    /// so the user can see why.
    fn failure(&self, message: &str, diagnostic: &str);

    /// The whole run passed; emitted once, after cleanup.
    fn finished(&self, message: &str);
}

/// Writes colorized progress lines to the console.
///
/// # Example
///
/// ```rust
/// use q2_provision::{ConsoleReporter, Phase, Reporter};
///
/// let reporter = ConsoleReporter;
/// reporter.progress(Phase::Download, "Downloading Miniconda...");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn progress(&self, phase: Phase, message: &str) {
        println!("{} {}", phase.icon(), message);
    }

    fn success(&self, phase: Phase, message: &str) {
        println!("{} {}", phase.icon(), message.blue());
    }

    fn failure(&self, message: &str, diagnostic: &str) {
        eprintln!("{}", message.red());
        if !diagnostic.is_empty() {
            eprintln!("{}", diagnostic);
        }
    }

    fn finished(&self, message: &str) {
        println!("{}", message.green());
    }
}
