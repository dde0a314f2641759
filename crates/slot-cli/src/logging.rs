//! Tracing setup for the `slots` binary.
//!
//! Logs go to stderr so stdout carries only JSON.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with a default level, overridable through `RUST_LOG`.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}
