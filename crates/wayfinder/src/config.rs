//! Navigator configuration
//!
//! Loaded from YAML or built in code:
//!
//! ```yaml
//! use_resetter: true
//! settle_timeout_ms: 10000
//! poll_interval_ms: 250
//! log:
//!   level: debug
//!   format: json
//! ```

use crate::result::{NavError, NavResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default time a view gets to appear after a step's transition
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 5_000;

/// Default interval between view predicate checks
pub const DEFAULT_SETTLE_POLL_MS: u64 = 100;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive (`info`, `wayfinder=debug`, ...); `RUST_LOG` wins
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Navigator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Allow one refresh-and-retry when a view does not show up
    pub use_resetter: bool,
    /// How long a view may take to appear after a transition
    pub settle_timeout_ms: u64,
    /// Interval between view predicate checks
    pub poll_interval_ms: u64,
    /// Logging setup
    pub log: LogConfig,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            use_resetter: true,
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_SETTLE_POLL_MS,
            log: LogConfig::default(),
        }
    }
}

impl NavigatorConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check each view exactly once after its transition, no polling
    #[must_use]
    pub fn immediate() -> Self {
        Self::default().with_settle_timeout(0)
    }

    /// Set the default for refresh-and-retry
    #[must_use]
    pub const fn with_resetter(mut self, use_resetter: bool) -> Self {
        self.use_resetter = use_resetter;
        self
    }

    /// Set the settle timeout
    #[must_use]
    pub const fn with_settle_timeout(mut self, timeout_ms: u64) -> Self {
        self.settle_timeout_ms = timeout_ms;
        self
    }

    /// Set the predicate polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set logging configuration
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Parse from YAML; missing fields take their defaults
    pub fn from_yaml(yaml: &str) -> NavResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> NavResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> NavResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject settings the navigator cannot work with
    pub fn validate(&self) -> NavResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(NavError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.log.level.trim().is_empty() {
            return Err(NavError::Config {
                message: "log.level must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Wait options used when checking a view after its transition
    #[must_use]
    pub fn settle_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.settle_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }
}
