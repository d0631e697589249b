//! Application configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::scanner::rules::{DEFAULT_LONG_EXPIRATION_SECS, DEFAULT_SENSITIVE_NAMES};
use crate::scanner::{CookieSource, MalformedCookiePolicy};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP request settings
    pub scanner: ScannerConfig,

    /// Rulebook settings
    pub rules: RulesConfig,

    /// Web form settings
    pub web: WebConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Follow redirects
    pub follow_redirects: bool,

    /// Maximum redirect depth
    pub max_redirects: usize,

    /// User agent string
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Cookie names flagged when scoped to `/`
    pub sensitive_names: Vec<String>,

    /// Max-Age (seconds) above which expiration is considered long
    pub long_expiration_secs: i64,

    /// What to do with cookies whose first segment has no `=`
    pub malformed_cookies: MalformedCookiePolicy,

    /// Which cookie representation(s) of the response to analyze
    pub cookie_source: CookieSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for the web form
    pub listen_addr: String,

    /// Listen port
    pub port: u16,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            request_timeout: 10,
            follow_redirects: true,
            max_redirects: 10,
            user_agent: format!("CookieHunter/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            sensitive_names: DEFAULT_SENSITIVE_NAMES.iter().map(|s| s.to_string()).collect(),
            long_expiration_secs: DEFAULT_LONG_EXPIRATION_SECS,
            malformed_cookies: MalformedCookiePolicy::default(),
            cookie_source: CookieSource::default(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            let config = Self::from_toml(&contents)?;

            tracing::info!("Loaded configuration from {:?}", config_path);
            Ok(config)
        } else if path.is_some() {
            Err(ConfigError::NotFound(config_path.display().to_string()).into())
        } else {
            tracing::info!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Reject values the scanner cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.request_timeout == 0 {
            return Err(ConfigError::ValidationError {
                field: "scanner.request_timeout".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.rules.long_expiration_secs <= 0 {
            return Err(ConfigError::ValidationError {
                field: "rules.long_expiration_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.web.port == 0 {
            return Err(ConfigError::ValidationError {
                field: "web.port".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get default configuration file path
    fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("io", "cookiehunter", "cookiehunter")
            .context("Failed to determine config directory")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("io", "cookiehunter", "cookiehunter")
            .context("Failed to determine data directory")?;

        Ok(dirs.data_dir().to_path_buf())
    }
}
