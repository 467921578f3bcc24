//! Configuration management for the EventPass store.
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present) with sensible defaults. Every key is optional.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

use eventpass_runtime::StoreConfig;

use crate::reducer::CapacityPolicy;

const LOG_LEVEL: &str = "EVENTPASS_LOG_LEVEL";
const CAPACITY_POLICY: &str = "EVENTPASS_CAPACITY_POLICY";
const BROADCAST_CAPACITY: &str = "EVENTPASS_BROADCAST_CAPACITY";
const SHUTDOWN_TIMEOUT_SECS: &str = "EVENTPASS_SHUTDOWN_TIMEOUT_SECS";
const SEED_DEMO: &str = "EVENTPASS_SEED_DEMO";

/// A configuration value that could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    /// Environment variable name
    pub key: &'static str,
    /// Raw value found
    pub value: String,
    /// What was expected
    pub reason: String,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Check-in behaviour once an event is full
    pub capacity_policy: CapacityPolicy,
    /// Buffered actions per subscriber before it lags
    pub broadcast_capacity: usize,
    /// How long unmounting waits for a running dispatch
    pub shutdown_timeout: Duration,
    /// Start from the demo session instead of an empty state
    pub seed_demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            capacity_policy: CapacityPolicy::Reject,
            broadcast_capacity: 64,
            shutdown_timeout: Duration::from_secs(5),
            seed_demo: true,
        }
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is present but unparseable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(LOG_LEVEL) {
            if level.trim().is_empty() {
                return Err(invalid(LOG_LEVEL, &level, "cannot be empty"));
            }
            config.log_level = level;
        }

        if let Some(raw) = lookup(CAPACITY_POLICY) {
            config.capacity_policy = raw
                .parse()
                .map_err(|reason: String| invalid(CAPACITY_POLICY, &raw, reason))?;
        }

        if let Some(raw) = lookup(BROADCAST_CAPACITY) {
            config.broadcast_capacity = match raw.trim().parse::<usize>() {
                Ok(0) => return Err(invalid(BROADCAST_CAPACITY, &raw, "must be at least 1")),
                Ok(capacity) => capacity,
                Err(e) => return Err(invalid(BROADCAST_CAPACITY, &raw, e.to_string())),
            };
        }

        if let Some(raw) = lookup(SHUTDOWN_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(SHUTDOWN_TIMEOUT_SECS, &raw, e.to_string()))?;
            config.shutdown_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(SEED_DEMO) {
            config.seed_demo = parse_bool(SEED_DEMO, &raw)?;
        }

        Ok(config)
    }

    /// Store settings derived from this configuration
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_broadcast_capacity(self.broadcast_capacity)
            .with_shutdown_timeout(self.shutdown_timeout)
    }
}
