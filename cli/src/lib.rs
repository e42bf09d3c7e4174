//! Jobtrail command-line application
//!
//! This is the thin application shell that parses commands and wires the
//! crates together. Core business logic lives in the `crates/` directory.

pub mod commands;
pub mod error;
pub mod routine;
pub mod state;

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,jobtrail=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
