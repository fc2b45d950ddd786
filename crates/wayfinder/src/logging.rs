//! Tracing subscriber setup.

use crate::config::{LogConfig, LogFormat};
use crate::result::{NavError, NavResult};
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber for `config`.
///
/// `RUST_LOG`, when set, takes precedence over `config.level`. Returns
/// `Ok(false)` when a subscriber was already installed, so test suites can
/// call this from every test.
pub fn init_logging(config: &LogConfig) -> NavResult<bool> {
    let filter = build_filter(config)?;
    let installed = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init()
            .is_ok(),
    };
    Ok(installed)
}

fn build_filter(config: &LogConfig) -> NavResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| NavError::Config {
        message: format!("invalid log level '{}': {e}", config.level),
    })
}
