// Store configuration
//
// Read from the process environment:
//   SIMPLEBANK_DB_PATH          database file (default: simplebank.db)
//   SIMPLEBANK_FOREIGN_KEYS     true/false/1/0 (default: false)
//   SIMPLEBANK_BUSY_TIMEOUT_MS  milliseconds to wait on a locked database (default: 5000)

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DB_PATH_ENV: &str = "SIMPLEBANK_DB_PATH";
pub const FOREIGN_KEYS_ENV: &str = "SIMPLEBANK_FOREIGN_KEYS";
pub const BUSY_TIMEOUT_ENV: &str = "SIMPLEBANK_BUSY_TIMEOUT_MS";

const DEFAULT_DB_PATH: &str = "simplebank.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// SQLite database file
    pub path: PathBuf,

    /// Enforce the REFERENCES declarations on entries/transfers.
    /// Off by default: account references are not validated on insert.
    pub foreign_keys: bool,

    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            foreign_keys: false,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from any variable lookup (used by `from_env` and tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            config.path = PathBuf::from(path);
        }

        if let Some(value) = lookup(FOREIGN_KEYS_ENV) {
            config.foreign_keys = parse_bool(&value).ok_or(ConfigError::Invalid {
                var: FOREIGN_KEYS_ENV,
                value,
            })?;
        }

        if let Some(value) = lookup(BUSY_TIMEOUT_ENV) {
            let millis = value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                var: BUSY_TIMEOUT_ENV,
                value: value.clone(),
            })?;
            config.busy_timeout = Duration::from_millis(millis);
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
