//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults (see [`defaults`])
//! 2. Optional config file (`config/default.*` or an explicit path)
//! 3. Environment variables, e.g. `MEDIA_SCRAPER__SCRAPER__MAX_IN_FLIGHT=500`

#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const ENV_PREFIX: &str = "MEDIA_SCRAPER";
const ENV_SEPARATOR: &str = "__";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

/// Fetching and fan-out settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whole-request timeout in seconds
    pub request_timeout_seconds: u64,

    /// TCP connect timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Declared client identity; many sites reject unidentified clients
    pub user_agent: String,

    pub follow_redirects: bool,

    pub max_redirects: usize,

    /// Cap on concurrently fetching workers. `None` means unbounded fan-out.
    pub max_in_flight: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection string, e.g. `sqlite:./data/media.db` or `sqlite::memory:`
    pub url: String,

    pub max_connections: u32,

    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            connect_timeout_seconds: defaults::CONNECT_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            follow_redirects: true,
            max_redirects: defaults::MAX_REDIRECTS,
            max_in_flight: None,
        }
    }
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let url = ConfigManager::get_app_data_dir()
            .map(|dir| format!("sqlite:{}", dir.join(defaults::DATABASE_FILE).display()))
            .unwrap_or_else(|_| format!("sqlite:./data/{}", defaults::DATABASE_FILE));
        Self {
            url,
            max_connections: defaults::DB_MAX_CONNECTIONS,
            idle_timeout_seconds: defaults::DB_IDLE_TIMEOUT_SECONDS,
        }
    }
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: defaults::DEFAULT_PAGE_SIZE,
            max_page_size: defaults::MAX_PAGE_SIZE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load defaults, then `config/default.*` if present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(None)
    }

    /// Load with an explicit config file (toml/json/yaml by extension).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::build(Some(path))
    }

    fn build(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&Self::default())?;
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config/default").required(false),
        };

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: &str| {
            Err(ConfigError::Validation {
                message: message.to_string(),
            })
        };

        if self.scraper.request_timeout_seconds == 0 {
            return fail("scraper.request_timeout_seconds must be greater than 0");
        }
        if self.scraper.connect_timeout_seconds == 0 {
            return fail("scraper.connect_timeout_seconds must be greater than 0");
        }
        if self.scraper.max_in_flight == Some(0) {
            return fail("scraper.max_in_flight must be greater than 0 when set");
        }
        if self.database.max_connections == 0 {
            return fail("database.max_connections must be greater than 0");
        }
        if self.query.default_page_size == 0 || self.query.max_page_size == 0 {
            return fail("query page sizes must be greater than 0");
        }
        if self.query.default_page_size > self.query.max_page_size {
            return fail("query.default_page_size cannot be greater than query.max_page_size");
        }
        Ok(())
    }
}

/// Locates per-user config and data directories
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);
        Ok(config_dir)
    }

    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);
        Ok(data_dir)
    }

    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE);
        Ok(Self { config_path })
    }

    /// Load the user config file if it exists, otherwise the layered defaults.
    pub fn load_config(&self) -> Result<AppConfig> {
        let config = if self.config_path.exists() {
            info!("Loading configuration from: {:?}", self.config_path);
            AppConfig::from_file(&self.config_path)
        } else {
            AppConfig::load()
        };
        config.with_context(|| format!("Failed to load configuration ({:?})", self.config_path))
    }
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "media-scraper";

    pub const CONFIG_FILE: &str = "config.toml";

    pub const DATABASE_FILE: &str = "media_scraper.db";

    /// Fixed per-fetch timeout; the only deadline in the pipeline
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    pub const CONNECT_TIMEOUT_SECONDS: u64 = 10;

    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

    pub const MAX_REDIRECTS: usize = 10;

    pub const DB_MAX_CONNECTIONS: u32 = 20;

    pub const DB_IDLE_TIMEOUT_SECONDS: u64 = 30;

    pub const DEFAULT_PAGE_SIZE: u32 = crate::domain::pagination::DEFAULT_PAGE_SIZE;

    pub const MAX_PAGE_SIZE: u32 = 200;

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scraper.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.scraper.max_in_flight, None);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.query.default_page_size, 20);
        assert!(config.scraper.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn rejects_inconsistent_page_sizes() {
        let mut config = AppConfig::default();
        config.query.default_page_size = 500;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_zero_in_flight_cap() {
        let mut config = AppConfig::default();
        config.scraper.max_in_flight = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[scraper]\nrequest_timeout_seconds = 3\nmax_in_flight = 64\n\n[query]\nmax_page_size = 50"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.scraper.request_timeout_seconds, 3);
        assert_eq!(config.scraper.max_in_flight, Some(64));
        assert_eq!(config.query.max_page_size, 50);
        assert_eq!(config.query.default_page_size, 20);
        assert_eq!(config.database.max_connections, 20);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::Load { .. })));
    }
}
