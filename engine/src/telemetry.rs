//! Telemetry and Observability
//!
//! Handles setting up `tracing-subscriber` for structured logging.
//! Supports config-driven log levels, environment variable overrides,
//! and format switching between pretty (debug) and JSON (release).
//!
//! The subscriber is installed once, before the configuration is read, and
//! its filter is swapped when the configured level becomes known.

use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

fn filter_for(log_level: &str) -> EnvFilter {
    EnvFilter::new(format!("{},molt_engine={}", log_level, log_level))
}

/// Initialize the tracing subscriber with the given log level.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter > default "info"
///
/// In debug builds: pretty-printed terminal output.
/// In release builds: JSON structured output with spans.
pub fn init_telemetry_with_level(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(log_level));
    let (filter, handle) = reload::Layer::new(env_filter);

    #[cfg(debug_assertions)]
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().pretty().with_target(false))
        .try_init()
        .is_ok();

    #[cfg(not(debug_assertions))]
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_current_span(true))
        .try_init()
        .is_ok();

    if installed {
        let _ = FILTER_HANDLE.set(handle);
    }
}

/// Switch the active level once the configuration has been loaded.
///
/// No-op when `RUST_LOG` is set or when no subscriber was installed here.
pub fn update_log_level(log_level: &str) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }

    if let Some(handle) = FILTER_HANDLE.get() {
        if let Err(e) = handle.reload(filter_for(log_level)) {
            tracing::warn!("Could not apply log level '{}': {}", log_level, e);
        }
    }
}
