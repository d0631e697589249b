//! Custom error types for CookieHunter
//!
//! The cookie parser and rule engine cannot fail; everything here belongs to
//! the surrounding plumbing (configuration, transport, export, web server).

use thiserror::Error;

/// Main error type for CookieHunter operations
#[derive(Error, Debug)]
pub enum CookieHunterError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Report export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Web server errors
    #[error("Web server error: {0}")]
    Web(#[from] WebError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Configuration file not found: {0}")]
    NotFound(String),
}

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),
}

/// Report export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Web server errors
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Server error: {0}")]
    Serve(String),
}

impl CookieHunterError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CookieHunterError::Config(e) => format!("Configuration problem: {}", e.user_hint()),
            CookieHunterError::Http(e) => match e {
                HttpError::InvalidUrl(_) | HttpError::InvalidBody(_) => {
                    format!("Error: {}", e.user_hint())
                }
                _ => format!("Error sending request: {}", e.user_hint()),
            },
            CookieHunterError::Export(e) => format!("Error saving file: {}", e.user_hint()),
            CookieHunterError::Web(e) => format!("Web server issue: {}", e.user_hint()),
        }
    }
}

/// Trait for providing user-friendly hints
pub trait UserHint {
    fn user_hint(&self) -> String;
}

impl UserHint for ConfigError {
    fn user_hint(&self) -> String {
        match self {
            ConfigError::ParseError(_) => {
                "The configuration file has invalid syntax. Check for TOML formatting errors.".into()
            }
            ConfigError::ValidationError { field, reason } => {
                format!("Invalid value for '{}': {}", field, reason)
            }
            ConfigError::NotFound(path) => {
                format!("Configuration file '{}' not found. Run with --generate-config to create one.", path)
            }
        }
    }
}

impl UserHint for HttpError {
    fn user_hint(&self) -> String {
        match self {
            HttpError::ConnectionError(_) => {
                "Could not connect to the server. Check if it's running and accessible.".into()
            }
            HttpError::Timeout(ms) => {
                format!("Request timed out after {}ms. The server may be slow or unresponsive.", ms)
            }
            HttpError::InvalidUrl(url) => {
                format!("'{}' is not a valid URL. Check the format.", url)
            }
            HttpError::InvalidBody(_) => "Invalid JSON data".into(),
            HttpError::RequestFailed(_) => self.to_string(),
        }
    }
}

impl UserHint for ExportError {
    fn user_hint(&self) -> String {
        match self {
            ExportError::Write { path, source } => {
                format!("Could not write '{}': {}. Check the directory exists and is writable.", path, source)
            }
            ExportError::Serialize(_) => self.to_string(),
        }
    }
}

impl UserHint for WebError {
    fn user_hint(&self) -> String {
        match self {
            WebError::Bind { addr, .. } => {
                format!("Could not listen on {}. It may already be in use.", addr)
            }
            _ => self.to_string(),
        }
    }
}
