//! Typed runtime configuration.
//!
//! # Responsibility
//! - Describe storage location, log level and sync settings.
//! - Load settings from an optional TOML file, filling gaps with defaults.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - Loaded values are validated before use.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "quotegen";
const DB_FILE_NAME: &str = "quotegen.sqlite3";
const SESSION_DB_FILE_NAME: &str = "quotegen_session.sqlite3";
const LOG_DIR_NAME: &str = "logs";
const EXPORT_DIR_NAME: &str = "exports";
const SYNC_LIMIT_MAX: usize = 100;

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Remote sync settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// List endpoint returning items with a string `title`.
    pub endpoint: String,
    /// Number of items requested and accepted per fetch.
    pub limit: usize,
    pub interval_secs: u64,
    pub timeout_secs: u64,
    /// Category assigned to every remote quote.
    pub category: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://jsonplaceholder.typicode.com/posts".to_string(),
            limit: 5,
            interval_secs: 60,
            timeout_secs: 10,
            category: "Server".to_string(),
        }
    }
}

impl SyncSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub data_dir: PathBuf,
    /// `trace|debug|info|warn|error`; build-mode default when absent.
    pub log_level: Option<String>,
    pub sync: SyncSettings,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: None,
            sync: SyncSettings::default(),
        }
    }
}

impl QuoteConfig {
    /// Default config file location under the platform config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join("config.toml")
    }

    /// Loads configuration from `path`; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parses and validates TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.limit == 0 || self.sync.limit > SYNC_LIMIT_MAX {
            return Err(ConfigError::Invalid(format!(
                "sync.limit must be within 1..={SYNC_LIMIT_MAX}, got {}",
                self.sync.limit
            )));
        }
        if self.sync.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync.interval_secs must be at least 1".to_string(),
            ));
        }
        if self.sync.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.sync.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "sync.endpoint cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn session_db_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join(EXPORT_DIR_NAME)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, QuoteConfig};

    #[test]
    fn partial_toml_fills_defaults() {
        let config = QuoteConfig::from_toml_str(
            r#"
            data_dir = "/tmp/quotes"

            [sync]
            interval_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir.to_str(), Some("/tmp/quotes"));
        assert_eq!(config.sync.interval_secs, 5);
        assert_eq!(config.sync.limit, 5);
        assert_eq!(config.sync.category, "Server");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = QuoteConfig::from_toml_str("[sync]\nlimit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = QuoteConfig::from_toml_str("[sync]\ninterval_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = QuoteConfig::from_toml_str("data_dir = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
