//! Telemetry initialisation for the gateway.
//!
//! Structured JSON logs only; per-request spans come from
//! `tower_http::trace::TraceLayer`. Key material is never logged — the
//! hex pair exists solely in the upload response body.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the tracing subscriber.
///
/// Outputs structured JSON logs to stdout at the configured log level. A
/// `RUST_LOG` environment variable, when set, takes precedence.
///
/// # Errors
///
/// Returns an error if a subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
