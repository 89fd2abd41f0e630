//! Application error types with proper error chaining.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures of the metrics registry.
///
/// Registration failures (e.g. a metric name registered twice) are
/// configuration errors and are only expected at startup.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Metric registration failed: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("Metric encoding failed: {0}")]
    Encoding(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::string::FromUtf8Error> for MetricsError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        MetricsError::Encoding(err.to_string())
    }
}
