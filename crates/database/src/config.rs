//! Store configuration read from the environment (and `.env`, if present).

use sea_orm::IsolationLevel;
use std::{env, time::Duration};
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MUTATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: `{value}` ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Connection and transaction settings for the relational store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Upper bound on one guarded mutation, from `begin` to `commit`
    pub mutation_timeout: Duration,
    /// `None` keeps the store's default isolation level
    pub isolation: Option<IsolationLevel>,
}

impl StoreConfig {
    /// Settings for `database_url` with the defaults used in production
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            mutation_timeout: DEFAULT_MUTATION_TIMEOUT,
            isolation: Some(IsolationLevel::Serializable),
        }
    }

    /// Reads `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`, `MUTATION_TIMEOUT_SECS`
    /// and `MUTATION_ISOLATION`
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let mut config = Self::new(database_url);

        if let Some(value) = optional_var("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = value
                .parse()
                .ok()
                .filter(|&count| count > 0)
                .ok_or(ConfigError::Invalid {
                    var: "DATABASE_MAX_CONNECTIONS",
                    value,
                    reason: "expected a positive integer",
                })?;
        }

        if let Some(value) = optional_var("MUTATION_TIMEOUT_SECS") {
            let secs: u64 = value
                .parse()
                .ok()
                .filter(|&secs| secs > 0)
                .ok_or(ConfigError::Invalid {
                    var: "MUTATION_TIMEOUT_SECS",
                    value,
                    reason: "expected a positive number of seconds",
                })?;
            config.mutation_timeout = Duration::from_secs(secs);
        }

        if let Some(value) = optional_var("MUTATION_ISOLATION") {
            config.isolation = parse_isolation(&value).ok_or(ConfigError::Invalid {
                var: "MUTATION_ISOLATION",
                value,
                reason: "expected serializable, repeatable-read, read-committed or none",
            })?;
        }

        Ok(config)
    }
}

fn optional_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Outer `None` means the value was not recognised
fn parse_isolation(value: &str) -> Option<Option<IsolationLevel>> {
    match value.to_ascii_lowercase().replace('_', "-").as_str() {
        "serializable" => Some(Some(IsolationLevel::Serializable)),
        "repeatable-read" => Some(Some(IsolationLevel::RepeatableRead)),
        "read-committed" => Some(Some(IsolationLevel::ReadCommitted)),
        "none" | "default" => Some(None),
        _ => None,
    }
}
