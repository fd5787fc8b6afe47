//! Diagnostic logging.
//!
//! Installs a global `tracing` subscriber from the `[logging]` config section.
//! `RUST_LOG` directives take precedence over the configured level. Logs go to
//! stderr so command output on stdout stays clean.

use crate::config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, fmt,
    filter::LevelFilter,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log level: {0}")]
    Level(String),
    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(logging: &LoggingConfig) -> Result<(), TelemetryError> {
    let level: LevelFilter = logging
        .level
        .parse()
        .map_err(|_| TelemetryError::Level(logging.level.clone()))?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}
