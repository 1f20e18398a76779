//! Configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments / environment variables (`ConfigOverrides`)
//! 2. TOML bootstrap file
//! 3. Compiled defaults
//!
//! A missing TOML file is not an error; an unreadable or malformed one is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3001;
/// Default bound on the database connection pool
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// Default CORS origin (the web frontend in development)
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
/// Default base URL of the external AI service
pub const DEFAULT_AI_API_URL: &str = "http://localhost:8000";
/// Timeout applied to every AI proxy call
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

/// Bootstrap configuration as read from the TOML file
///
/// Every field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    /// Comma-separated list or TOML array
    pub allowed_origins: Option<OriginList>,
    pub ai_api_url: Option<String>,
    pub ai_timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Allowed origins may be written either way in TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OriginList {
    Joined(String),
    List(Vec<String>),
}

impl OriginList {
    fn into_vec(self) -> Vec<String> {
        match self {
            OriginList::Joined(s) => split_origins(&s),
            OriginList::List(v) => v
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        }
    }
}

/// Logging section of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

/// Values supplied on the command line (or through their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub allowed_origins: Option<String>,
    pub ai_api_url: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub allowed_origins: Vec<String>,
    pub ai_api_url: String,
    pub ai_timeout: Duration,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: default_database_url(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            ai_api_url: DEFAULT_AI_API_URL.to_string(),
            ai_timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Merge overrides, TOML values and defaults into one configuration
    pub fn resolve(overrides: ConfigOverrides, file: Option<TomlConfig>) -> Result<Self> {
        let defaults = ServiceConfig::default();
        let file = file.unwrap_or_default();

        let config = ServiceConfig {
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            database_url: overrides
                .database_url
                .or(file.database_url)
                .unwrap_or(defaults.database_url),
            db_max_connections: overrides
                .db_max_connections
                .or(file.db_max_connections)
                .unwrap_or(defaults.db_max_connections),
            allowed_origins: overrides
                .allowed_origins
                .map(|s| split_origins(&s))
                .or_else(|| file.allowed_origins.map(OriginList::into_vec))
                .unwrap_or(defaults.allowed_origins),
            ai_api_url: overrides
                .ai_api_url
                .or(file.ai_api_url)
                .unwrap_or(defaults.ai_api_url),
            ai_timeout: file
                .ai_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.ai_timeout),
            log_level: overrides
                .log_level
                .or(file.logging.level)
                .unwrap_or(defaults.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.db_max_connections == 0 {
            return Err(Error::Config(
                "db_max_connections must be at least 1".to_string(),
            ));
        }
        if !is_http_url(&self.ai_api_url) {
            return Err(Error::Config(format!(
                "ai_api_url must be an http(s) URL: {}",
                self.ai_api_url
            )));
        }
        if self.database_url.trim().is_empty() {
            return Err(Error::Config("database_url must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load the TOML bootstrap file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        debug!("No config file at {}", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(Some(config))
}

/// Platform config file location (`<config_dir>/tunelib/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunelib").join("config.toml"))
}

/// Default SQLite database in the platform data directory
pub fn default_database_url() -> String {
    let path = dirs::data_local_dir()
        .map(|d| d.join("tunelib"))
        .unwrap_or_else(|| PathBuf::from("./tunelib_data"))
        .join("tunelib.db");
    format!("sqlite://{}", path.display())
}

/// Split a comma-separated origin list, dropping blanks
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_origins_trims_and_drops_blanks() {
        let origins = split_origins(" http://a.test , ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = ServiceConfig::resolve(ConfigOverrides::default(), None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.ai_timeout, Duration::from_secs(30));
        assert!(config.database_url.starts_with("sqlite://"));
    }

    #[test]
    fn test_overrides_beat_file_values() {
        let file = TomlConfig {
            port: Some(4000),
            ai_api_url: Some("http://file.test".to_string()),
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            port: Some(5000),
            ..Default::default()
        };

        let config = ServiceConfig::resolve(overrides, Some(file)).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.ai_api_url, "http://file.test");
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let overrides = ConfigOverrides {
            db_max_connections: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            ServiceConfig::resolve(overrides, None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_non_http_ai_url_rejected() {
        let overrides = ConfigOverrides {
            ai_api_url: Some("ftp://ai.test".to_string()),
            ..Default::default()
        };
        assert!(ServiceConfig::resolve(overrides, None).is_err());
    }
}
