//! No-argument binary entry point.
//!
//! Behavior is determined entirely by ambient environment state (is conda
//! present, is QIIME 2 present) and the fixed plan constants. Exit code 0 on
//! full success, 1 on any step failure.

use q2_provision::{preflight, provision, CleanupManager, ConsoleReporter, SystemRunner};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let runner = SystemRunner;
    let reporter = ConsoleReporter;
    let cleanup = CleanupManager::new();

    let ctx = preflight(&runner).await;
    match provision(&runner, &reporter, ctx, &cleanup).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(1),
    }
}

/// Install the tracing subscriber.
///
/// The level comes from `Q2_PROVISION_LOG` (e.g. "debug"); it defaults to
/// warn so the reporter owns the console during a normal run.
fn init_logging() {
    let level = std::env::var("Q2_PROVISION_LOG")
        .ok()
        .and_then(|s| s.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::WARN);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
