//! HTTP client implementation

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use std::str::FromStr;
use std::time::{Duration, Instant};

use super::request::{HttpMethod, Request};
use super::response::{Cookie, Response};
use crate::app::ScannerConfig;
use crate::error::HttpError;

/// HTTP client wrapper
pub struct HttpClient {
    /// Inner reqwest client
    client: reqwest::Client,

    /// Request timeout, kept for error reporting
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &ScannerConfig) -> Result<Self, HttpError> {
        let timeout = Duration::from_secs(config.request_timeout);
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(redirect)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| HttpError::RequestFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Execute a request
    pub async fn execute(&self, request: &Request) -> Result<Response, HttpError> {
        let start = Instant::now();

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);

        // Set headers, skipping any the client cannot encode
        let mut headers = HeaderMap::new();
        for (key, value) in &request.headers {
            match (HeaderName::from_str(key), HeaderValue::from_str(value)) {
                (Ok(name), Ok(val)) => {
                    headers.insert(name, val);
                }
                _ => tracing::warn!(header = %key, "Skipping invalid header"),
            }
        }
        builder = builder.headers(headers);

        if request.method == HttpMethod::Post {
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        }

        tracing::debug!(method = request.method.as_str(), url = %request.url, "Sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| self.classify_error(e, &request.url))?;

        Ok(build_response(response, start.elapsed()))
    }

    fn classify_error(&self, err: reqwest::Error, url: &str) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(self.timeout.as_millis() as u64)
        } else if err.is_connect() {
            HttpError::ConnectionError(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(url.to_string())
        } else {
            HttpError::RequestFailed(err.to_string())
        }
    }
}

/// Build response from reqwest response
fn build_response(response: reqwest::Response, duration: Duration) -> Response {
    let status = response.status().as_u16();
    let status_text = response
        .status()
        .canonical_reason()
        .unwrap_or("")
        .to_string();

    let set_cookies: Vec<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect();

    let cookies: Vec<Cookie> = response
        .cookies()
        .map(|c| Cookie {
            name: c.name().to_string(),
            value: c.value().to_string(),
            domain: c.domain().map(|s| s.to_string()),
            path: c.path().map(|s| s.to_string()),
            expires: c.expires().map(DateTime::<Utc>::from),
            max_age: c.max_age().map(|d| d.as_secs() as i64),
            secure: c.secure(),
            http_only: c.http_only(),
            same_site: if c.same_site_strict() {
                Some("Strict".to_string())
            } else if c.same_site_lax() {
                Some("Lax".to_string())
            } else {
                None
            },
        })
        .collect();

    tracing::debug!(
        status,
        set_cookie_headers = set_cookies.len(),
        cookies = cookies.len(),
        "Received response"
    );

    Response {
        status,
        status_text,
        set_cookies,
        cookies,
        duration_ms: duration.as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::new(&ScannerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_client_creation() {
        let config = ScannerConfig::default();
        assert!(HttpClient::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_collects_every_set_cookie_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("Set-Cookie", "session=abc; HttpOnly; SameSite=Lax")
                    .append_header("Set-Cookie", "prefs=dark; Secure; Max-Age=60"),
            )
            .mount(&server)
            .await;

        let request = Request::new(HttpMethod::Get, &format!("{}/", server.uri()));
        let response = client().execute(&request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(
            response.set_cookies,
            vec![
                "session=abc; HttpOnly; SameSite=Lax".to_string(),
                "prefs=dark; Secure; Max-Age=60".to_string(),
            ]
        );
        assert_eq!(response.cookies.len(), 2);

        let session = response.cookies.iter().find(|c| c.name == "session").unwrap();
        assert!(session.http_only);
        assert!(!session.secure);
        assert_eq!(session.same_site.as_deref(), Some("Lax"));

        let prefs = response.cookies.iter().find(|c| c.name == "prefs").unwrap();
        assert!(prefs.secure);
        assert_eq!(prefs.max_age, Some(60));
    }

    #[tokio::test]
    async fn test_post_sends_json_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(serde_json::json!({"user": "alice"})))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let request = Request::builder()
            .method(HttpMethod::Post)
            .url(&format!("{}/login", server.uri()))
            .header("X-Trace", "1")
            .json(Some(serde_json::json!({"user": "alice"})))
            .build();

        let response = client().execute(&request).await.unwrap();
        assert_eq!(response.status, 201);
        assert!(!response.has_cookies());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let request = Request::new(HttpMethod::Get, "http://127.0.0.1:1/");
        let err = client().execute(&request).await.unwrap_err();

        assert!(matches!(
            err,
            HttpError::ConnectionError(_) | HttpError::RequestFailed(_)
        ));
    }
}
