use chrono::{DateTime, Utc};
use tracing::Level;

/// Installs the global tracing subscriber. Debug builds log at DEBUG.
pub fn init_logging() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    if let Err(err) = dioxus::logger::init(level) {
        eprintln!("[songdrop] logger already initialized: {err}");
    }
}

#[inline]
pub fn log_perf(scope: &str, started_at: DateTime<Utc>, details: &str) {
    let elapsed_ms = (Utc::now() - started_at).num_milliseconds();
    if details.trim().is_empty() {
        tracing::debug!(target: "perf", %scope, elapsed_ms, "took {elapsed_ms}ms");
    } else {
        tracing::debug!(target: "perf", %scope, elapsed_ms, "took {elapsed_ms}ms | {details}");
    }
}
