//! Tracing subscriber installation.

use tracing_subscriber::EnvFilter;

use crate::config::logging::LoggingConfig;

/// Install the global tracing subscriber from the logging config.
///
/// Safe to call more than once; subsequent calls are no-ops (used by tests
/// that each set up their own engine).
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
