#![forbid(unsafe_code)]

//! Per-cell configuration.
//!
//! Configuration only affects how a cell reports itself (log events and
//! `Debug` output). It never changes the type guard or change detection.
//!
//! # Environment Variables
//!
//! Cells never read the environment themselves: `ValueCell::new` uses
//! [`CellConfig::default`]. The variables below apply only to a config built
//! with [`CellConfig::from_env`] and passed to `ValueCell::with_config`.
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `FTUI_STATE_LOG_VALUES` | `1/0`, `true/false`, `yes/no`, `on/off` | `false` |

use std::env;

use tracing::warn;

use crate::error::ConfigError;

/// Environment key enabling value rendering in log events.
pub const ENV_LOG_VALUES: &str = "FTUI_STATE_LOG_VALUES";

/// Configuration for a [`ValueCell`](crate::ValueCell).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellConfig {
    /// Name reported in log events and `Debug` output.
    pub label: Option<String>,
    /// Include `Debug` renderings of values in log events.
    ///
    /// Off by default: values may be large or sensitive.
    pub log_values: bool,
}

impl CellConfig {
    /// Default configuration: unlabeled, values not logged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set whether values are rendered in log events.
    #[must_use]
    pub fn with_log_values(mut self, enabled: bool) -> Self {
        self.log_values = enabled;
        self
    }

    /// Read configuration from the process environment.
    ///
    /// Invalid values are ignored with a warning and the default is kept.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok()).unwrap_or_else(|err| {
            warn!(target: "ftui_state", error = %err, "ignoring invalid state config");
            Self::default()
        })
    }

    /// Read configuration through a custom lookup.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = get(ENV_LOG_VALUES) {
            config.log_values = parse_bool(&value).ok_or_else(|| {
                ConfigError::new(ENV_LOG_VALUES, value, "expected bool (1/0/true/false)")
            })?;
        }
        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
