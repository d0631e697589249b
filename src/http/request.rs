//! HTTP request types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::HttpError;

/// Supported request methods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPER")]
pub enum HttpMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// HTTP request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Request {
    /// HTTP method
    pub method: HttpMethod,

    /// Request URL
    pub url: String,

    /// Request headers
    pub headers: HashMap<String, String>,

    /// JSON body, sent with POST
    pub body: Option<serde_json::Value>,
}

impl Request {
    /// Create a new request
    pub fn new(method: HttpMethod, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// Create a builder for constructing requests
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Whether the request goes over TLS
    pub fn is_https(&self) -> bool {
        self.url.to_lowercase().starts_with("https://")
    }
}

/// Builder for constructing requests
#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Set the request method
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.request.method = method;
        self
    }

    /// Set the request URL
    pub fn url(mut self, url: &str) -> Self {
        self.request.url = url.to_string();
        self
    }

    /// Add a header
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.request.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Add multiple headers
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.request.headers.extend(headers);
        self
    }

    /// Set JSON body
    pub fn json(mut self, body: Option<serde_json::Value>) -> Self {
        self.request.body = body;
        self
    }

    /// Build the request
    pub fn build(self) -> Request {
        self.request
    }
}

/// Parse `Key: Value` header lines. Lines without a `:` are ignored.
pub fn parse_header_lines<I, S>(lines: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let (key, value) = line.as_ref().split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parse a JSON request body supplied as text. Blank input means no body.
pub fn parse_json_body(raw: &str) -> Result<Option<serde_json::Value>, HttpError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| HttpError::InvalidBody(e.to_string()))
}

/// Validate a target URL, defaulting to `https://` when no scheme is given.
pub fn normalize_url(raw: &str) -> Result<String, HttpError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(HttpError::InvalidUrl(raw.to_string()));
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let parsed = url::Url::parse(&candidate).map_err(|_| HttpError::InvalidUrl(raw.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(candidate),
        _ => Err(HttpError::InvalidUrl(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = Request::builder()
            .method(HttpMethod::Post)
            .url("https://api.example.com/login")
            .header("X-Custom", "value")
            .json(Some(serde_json::json!({"user": "test"})))
            .build();

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://api.example.com/login");
        assert_eq!(req.headers.get("X-Custom"), Some(&"value".to_string()));
        assert_eq!(req.body.unwrap()["user"], "test");
    }

    #[test]
    fn test_is_https() {
        assert!(Request::new(HttpMethod::Get, "HTTPS://example.com").is_https());
        assert!(!Request::new(HttpMethod::Get, "http://example.com").is_https());
    }

    #[test]
    fn test_parse_header_lines() {
        let headers = parse_header_lines([
            "User-Agent: CookieHunter/1.0",
            "Authorization: Bearer a:b",
            "no colon here",
            "  ",
        ]);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers["User-Agent"], "CookieHunter/1.0");
        assert_eq!(headers["Authorization"], "Bearer a:b");
    }

    #[test]
    fn test_parse_json_body() {
        assert!(parse_json_body("").unwrap().is_none());
        assert_eq!(parse_json_body(r#"{"k": 1}"#).unwrap().unwrap()["k"], 1);
        assert!(matches!(
            parse_json_body("{not json"),
            Err(HttpError::InvalidBody(_))
        ));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com").unwrap(), "https://example.com");
        assert_eq!(
            normalize_url("http://example.com/a").unwrap(),
            "http://example.com/a"
        );
        assert!(normalize_url("").is_err());
        assert!(normalize_url("ftp://example.com").is_err());
        assert!(normalize_url("https://").is_err());
    }

    #[test]
    fn test_method_deserializes_either_case() {
        let upper: HttpMethod = serde_json::from_str(r#""POST""#).unwrap();
        let lower: HttpMethod = serde_json::from_str(r#""get""#).unwrap();
        assert_eq!(upper, HttpMethod::Post);
        assert_eq!(lower, HttpMethod::Get);
    }
}
