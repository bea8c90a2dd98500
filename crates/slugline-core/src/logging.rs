//! Tracing subscriber setup for hosts embedding the slug engine.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

const FALLBACK_LEVEL: &str = "info";

/// ## Summary
/// Installs a global `tracing` subscriber filtered by the configured level.
///
/// An unparsable level falls back to `info` with a warning. `RUST_LOG` is not
/// consulted; the configuration is the single source of the filter.
///
/// ## Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let (filter, invalid) = match EnvFilter::try_new(config.level.as_str()) {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new(FALLBACK_LEVEL), true),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()?;

    if invalid {
        tracing::warn!(level = %config.level, "Invalid log level in config, using {FALLBACK_LEVEL}");
    }

    Ok(())
}
