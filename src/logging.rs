//! Logging initialization.
//!
//! Built on `tracing` / `tracing-subscriber` with environment-variable
//! level control.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global subscriber.
///
/// # Environment
/// - `RUST_LOG`: level filter (default: `info`),
///   e.g. `RUST_LOG=debug` or `RUST_LOG=taskalign_scheduler=trace`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Initializes logging for tests, capturing output per test.
///
/// Safe to call from multiple tests; later calls are no-ops.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
