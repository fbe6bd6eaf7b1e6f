//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives).
//!   Unset, it falls back to `DEFAULT_FILTER`:
//!   "info,dragdrop=debug,dragdrop_backend=debug,events=info,tower_http=info,axum=info".
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! Targets in use: `dragdrop` (grading decisions), `dragdrop_backend`
//! (service and transport) and `events` (published grade/analytics events).

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,dragdrop=debug,dragdrop_backend=debug,events=info,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // JSON and pretty builders are different types; init each branch directly.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
