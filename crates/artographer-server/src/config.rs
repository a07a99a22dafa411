//! Server configuration from environment variables (after `.env` is loaded).
//!
//! | variable                     | default       |
//! |------------------------------|---------------|
//! | `ARTOGRAPHER_HOST`           | `0.0.0.0`     |
//! | `ARTOGRAPHER_PORT`           | `3000`        |
//! | `ARTOGRAPHER_DB_PATH`        | `database.db` |
//! | `ARTOGRAPHER_DASHBOARD_DIR`  | `./dashboard` |
//! | `ARTOGRAPHER_DASHBOARD_LOGS` | `50`          |
//! | `ARTOGRAPHER_LOG_JSON`       | `false`       |

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub dashboard_dir: PathBuf,
    pub dashboard_log_limit: u32,
    pub log_json: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be true or false, got '{value}'")]
    InvalidBool { key: &'static str, value: String },
    #[error("invalid listen address '{0}'")]
    InvalidAddr(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            db_path: "database.db".into(),
            dashboard_dir: "./dashboard".into(),
            dashboard_log_limit: 50,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("ARTOGRAPHER_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("ARTOGRAPHER_PORT") {
            config.port = parse_number("ARTOGRAPHER_PORT", port)?;
        }
        if let Some(path) = lookup("ARTOGRAPHER_DB_PATH") {
            config.db_path = path.into();
        }
        if let Some(dir) = lookup("ARTOGRAPHER_DASHBOARD_DIR") {
            config.dashboard_dir = dir.into();
        }
        if let Some(limit) = lookup("ARTOGRAPHER_DASHBOARD_LOGS") {
            config.dashboard_log_limit = parse_number("ARTOGRAPHER_DASHBOARD_LOGS", limit)?;
        }
        if let Some(json) = lookup("ARTOGRAPHER_LOG_JSON") {
            config.log_json = parse_bool("ARTOGRAPHER_LOG_JSON", json)?;
        }

        Ok(config)
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddr(raw))
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { key, value })
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool { key, value }),
    }
}
