// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! The engine itself only emits `tracing` events; embedding applications
//! are free to install their own subscriber instead. This helper reads
//! the `FLOWDAG_LOG` environment variable (e.g. "info", "debug",
//! "flowdag=trace") and defaults to `info`.
//!
//! Logs go to STDERR so stdout stays free for application output.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global logging subscriber.
///
/// Safe to call once at startup; fails if a subscriber is already set.
pub fn init_logging() -> Result<()> {
    let filter =
        EnvFilter::try_from_env("FLOWDAG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing global tracing subscriber: {e}"))?;

    Ok(())
}
