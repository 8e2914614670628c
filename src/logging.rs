//! Logging setup for applications embedding Maui Index.
//!
//! The library itself only emits `tracing` events. This module installs a
//! `tracing_subscriber` formatter configured from [`LogConfig`].

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::error::{MauiError, MauiResult};

/// Filter built from `RUST_LOG` when set, otherwise from the configured level.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the global tracing subscriber.
///
/// # Returns
///
/// * `Ok(())` if the subscriber was installed
/// * `Err(MauiError::Custom)` if a global subscriber is already set
pub fn init_logging(config: &LogConfig) -> MauiResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| MauiError::Custom(format!("Failed to set global tracing subscriber: {e}")))?;

    tracing::debug!(
        level = %config.level,
        json = config.json,
        version = crate::VERSION,
        "logging initialized"
    );
    Ok(())
}
