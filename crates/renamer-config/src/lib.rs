//! Shared configuration for the batch rename toolchain.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults are
//! overridden by an optional TOML file (`--config-path` or
//! `RENAMER_CONFIG_PATH`), then by `RENAMER_*` environment variables, and
//! finally by command-line flags. The resolved [`Config`] controls telemetry
//! output and the label attached to the store transaction that wraps every
//! batch commit.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TRANSACTION_LABEL, default_log_filter, default_log_filter_string,
    default_log_format, default_transaction_label,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by the CLI and embedding hosts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "RENAMER")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `renamer_core=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for structured logs.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Label given to the store transaction opened for a commit.
    #[serde(default = "default_transaction_label")]
    #[ortho_config(default = default_transaction_label())]
    pub transaction_label: String,
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for structured logs.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Label given to the store transaction opened for a commit.
    #[must_use]
    pub fn transaction_label(&self) -> &str {
        &self.transaction_label
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            transaction_label: default_transaction_label(),
        }
    }
}
