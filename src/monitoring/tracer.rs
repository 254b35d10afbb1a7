/*!
 * Structured Tracing
 * Subscriber setup for binaries that host the lock
 *
 * The lock itself only emits events through the `tracing` macros:
 * - `trace`: an acquire exhausted its spin budget and started yielding
 * - `debug`: a contended acquire succeeded, with its wait time
 * - `error`: a lock invariant was violated
 */

use crate::core::limits::ENV_TRACE_JSON;
use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Initialize structured tracing for the process
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - RWLOCK_TRACE_JSON: Enable JSON output (default: false)
///
/// Does nothing beyond a debug note if a global subscriber is already set.
pub fn init_tracing() {
    if let Err(e) = try_init_tracing() {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

/// Like [`init_tracing`] but reports whether a subscriber was installed
pub fn try_init_tracing() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        // JSON output for log shipping
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?;
        info!("structured tracing initialized with JSON output");
    } else {
        // Human-readable output for development
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
        info!("structured tracing initialized");
    }

    Ok(())
}
