// src/config.rs

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FRONTEND_DIR: &str = "./frontend";
pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: PathBuf,
    pub chart_url: String,
    pub fetch_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Missing or blank keys
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("STOCK_PREDICTOR_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "STOCK_PREDICTOR_PORT",
                expected: "a TCP port number",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("FETCH_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "FETCH_TIMEOUT_SECS",
                        expected: "a positive number of seconds",
                        value,
                    })
                }
            },
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Ok(AppConfig {
            host: get("STOCK_PREDICTOR_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            frontend_dir: get("STOCK_PREDICTOR_FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRONTEND_DIR)),
            chart_url: get("YAHOO_CHART_URL").unwrap_or_else(|| DEFAULT_CHART_URL.to_string()),
            fetch_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
