//! Server configuration loaded from environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::ConfigError;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT".to_string(),
                message: format!("unknown format '{other}', expected 'json' or 'pretty'"),
            }),
        }
    }
}

/// Behaviour of the sample `/health` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthConfig {
    /// Upper bound of the random artificial delay.
    pub max_delay: Duration,
    /// Probability in `[0, 1]` of answering 500.
    pub failure_rate: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_delay: Duration::from_millis(100),
            failure_rate: 0.5,
        }
    }
}

impl HealthConfig {
    /// `failure_rate` limited to `[0, 1]`; non-finite rates count as 0.
    #[must_use]
    pub fn failure_probability(&self) -> f64 {
        if self.failure_rate.is_finite() {
            self.failure_rate.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// A health endpoint that always answers 200 immediately.
    #[must_use]
    pub fn always_healthy() -> Self {
        Self {
            max_delay: Duration::ZERO,
            failure_rate: 0.0,
        }
    }
}

/// Process-level configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Route serving the text exposition.
    pub metrics_path: String,
    /// Upper bound on a single request; exceeded requests get 408.
    pub request_timeout: Duration,
    /// Upper bound on draining in-flight requests after a shutdown signal.
    pub shutdown_timeout: Duration,
    pub health: HealthConfig,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            metrics_path: "/metrics".to_string(),
            request_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(10),
            health: HealthConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup, falling back to defaults
    /// for absent keys.
    ///
    /// # Errors
    /// Returns an error if a present value cannot be parsed or is out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = parse_or(&lookup, "SERVER_ADDR", defaults.bind_addr)?;

        let metrics_path = lookup("METRICS_PATH").unwrap_or(defaults.metrics_path);
        if !metrics_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "METRICS_PATH".to_string(),
                message: "must start with '/'".to_string(),
            });
        }

        let request_timeout = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10u64)?;
        let shutdown_timeout = parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 10u64)?;
        let max_delay_ms = parse_or(&lookup, "HEALTH_MAX_DELAY_MS", 100u64)?;

        let failure_rate = parse_or(&lookup, "HEALTH_FAILURE_RATE", defaults.health.failure_rate)?;
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err(ConfigError::InvalidValue {
                key: "HEALTH_FAILURE_RATE".to_string(),
                message: format!("{failure_rate} is outside [0, 1]"),
            });
        }

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            bind_addr,
            metrics_path,
            request_timeout: Duration::from_secs(request_timeout),
            shutdown_timeout: Duration::from_secs(shutdown_timeout),
            health: HealthConfig {
                max_delay: Duration::from_millis(max_delay_ms),
                failure_rate,
            },
            log_format,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
