use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Label attached to the store transaction wrapping a batch commit.
pub const DEFAULT_TRANSACTION_LABEL: &str = "Batch rename";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned transaction label used as the serde default.
#[must_use]
pub fn default_transaction_label() -> String {
    DEFAULT_TRANSACTION_LABEL.to_owned()
}
