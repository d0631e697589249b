//! HTTP response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// HTTP response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,

    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,

    /// Every raw `Set-Cookie` header value, in received order
    pub set_cookies: Vec<String>,

    /// Cookies as structured by the HTTP client
    pub cookies: Vec<Cookie>,

    /// Response time in milliseconds
    pub duration_ms: u64,
}

/// Cookie from the HTTP client's cookie view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,

    /// Cookie value
    pub value: String,

    /// Domain
    pub domain: Option<String>,

    /// Path
    pub path: Option<String>,

    /// Expiration
    pub expires: Option<DateTime<Utc>>,

    /// Max age in seconds
    pub max_age: Option<i64>,

    /// Secure flag
    pub secure: bool,

    /// HttpOnly flag
    pub http_only: bool,

    /// SameSite attribute
    pub same_site: Option<String>,
}

impl Response {
    /// Check if the response carried any cookie at all
    pub fn has_cookies(&self) -> bool {
        !self.set_cookies.is_empty() || !self.cookies.is_empty()
    }
}
