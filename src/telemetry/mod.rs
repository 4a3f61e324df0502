//! Tracing subscriber installation.

use crate::config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// The subscriber could not be installed.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level is not a tracing level.
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    /// A global subscriber is already set.
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` directives take precedence over the configured level.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the level is unknown or a subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let level: LevelFilter = config
        .level
        .parse()
        .map_err(|_| TelemetryError::InvalidLevel(config.level.clone()))?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(true))
            .try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests;
