//! Tracing subscriber setup for programs embedding the evaluation hooks.

use crate::config::LoggingConfig;
use crate::error::MlError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Build the filter for `config`. `RUST_LOG`, when set, wins over the config.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, MlError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| MlError::config(format!("invalid log filter {:?}: {e}", config.level)))
}

/// Install a global subscriber writing to stderr.
///
/// Returns `Ok(false)` if a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, MlError> {
    let filter = env_filter(config)?;

    let layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    };

    Ok(tracing_subscriber::registry().with(layer).try_init().is_ok())
}
