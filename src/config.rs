//! Runtime configuration loaded from environment variables.

use crate::telemetry::LogFormat;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_POOL_SIZE: u32 = 5;
const DEFAULT_TASK_SERVICE_TIMEOUT_SECS: u64 = 10;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    /// A variable is set to a value that cannot be used.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Maximum number of pooled database connections.
    pub database_pool_size: u32,
    /// Base URL of the task service.
    pub task_service_url: String,
    /// Timeout applied to each task service request.
    pub task_service_timeout: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// | Env Var                     | Default    |
    /// |-----------------------------|------------|
    /// | `DATABASE_URL`              | required   |
    /// | `DATABASE_POOL_SIZE`        | `5`        |
    /// | `TASK_SERVICE_URL`          | required   |
    /// | `TASK_SERVICE_TIMEOUT_SECS` | `10`       |
    /// | `LOG_FORMAT`                | `text`     |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let database_pool_size = parsed(&lookup, "DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if database_pool_size == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_POOL_SIZE",
                value: database_pool_size.to_string(),
                reason: "pool size must be at least 1".to_owned(),
            });
        }

        let task_service_url = required(&lookup, "TASK_SERVICE_URL")?;
        if !(task_service_url.starts_with("http://") || task_service_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid {
                key: "TASK_SERVICE_URL",
                value: task_service_url,
                reason: "expected an http or https URL".to_owned(),
            });
        }

        let timeout_secs = parsed(
            &lookup,
            "TASK_SERVICE_TIMEOUT_SECS",
            DEFAULT_TASK_SERVICE_TIMEOUT_SECS,
        )?;

        let log_format = lookup("LOG_FORMAT")
            .map(|value| parse_log_format(&value))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            database_url,
            database_pool_size,
            task_service_url,
            task_service_timeout: Duration::from_secs(timeout_secs),
            log_format,
        })
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    LogFormat::try_from(value).map_err(|err| ConfigError::Invalid {
        key: "LOG_FORMAT",
        value: value.to_owned(),
        reason: err.to_string(),
    })
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: err.to_string(),
    })
}
