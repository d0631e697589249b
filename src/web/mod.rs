//! Local web form
//!
//! Serves a single-page form and a JSON endpoint that runs one analysis per
//! submission.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::app::{Config, WebConfig};
use crate::error::{HttpError, UserHint, WebError};
use crate::http::{normalize_url, parse_header_lines, parse_json_body, HttpClient, HttpMethod, Request};
use crate::reporting::AnalysisResult;
use crate::scanner::CookieScanner;

const INDEX_HTML: &str = include_str!("index.html");

/// Shared handler state
pub struct WebState {
    pub client: HttpClient,
    pub scanner: CookieScanner,
}

impl WebState {
    pub fn from_config(config: &Config) -> Result<Self, HttpError> {
        Ok(Self {
            client: HttpClient::new(&config.scanner)?,
            scanner: CookieScanner::from_config(&config.rules),
        })
    }
}

pub fn create_router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Bind the configured address and serve until `shutdown` resolves
pub async fn serve<F>(config: &Config, shutdown: F) -> Result<(), WebError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = socket_addr(&config.web)?;
    let state = WebState::from_config(config).map_err(|e| WebError::Serve(e.to_string()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| WebError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
    let local = listener.local_addr().unwrap_or(addr);

    tracing::info!(addr = %local, "Web form listening");
    println!("CookieHunter web form running on http://{}", local);

    axum::serve(listener, create_router(Arc::new(state)))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| WebError::Serve(e.to_string()))?;

    tracing::info!("Web form stopped");
    Ok(())
}

fn socket_addr(web: &WebConfig) -> Result<SocketAddr, WebError> {
    let ip: IpAddr = web
        .listen_addr
        .parse()
        .map_err(|_| WebError::InvalidAddress(web.listen_addr.clone()))?;
    Ok(SocketAddr::new(ip, web.port))
}

/// Form submission
#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    method: Option<HttpMethod>,
    /// JSON body as text, POST only
    #[serde(default)]
    data: Option<String>,
    /// Newline-separated `Key: Value` lines
    #[serde(default)]
    headers: Option<String>,
}

impl AnalyzeRequest {
    fn into_request(self) -> Result<Request, ApiError> {
        let url = self
            .urls
            .first()
            .ok_or_else(|| ApiError::BadRequest("No URL provided".to_string()))?;
        let url = normalize_url(url)?;

        let method = self.method.unwrap_or_default();
        let body = match (&method, self.data.as_deref()) {
            (HttpMethod::Post, Some(raw)) => parse_json_body(raw)?,
            _ => None,
        };
        let headers = parse_header_lines(self.headers.as_deref().unwrap_or("").lines());

        Ok(Request::builder()
            .method(method)
            .url(&url)
            .headers(headers)
            .json(body)
            .build())
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analyze_handler(
    State(state): State<Arc<WebState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = payload.into_request()?;

    tracing::info!(method = request.method.as_str(), url = %request.url, "Web analysis requested");

    let outcome = state.scanner.analyze(&state.client, &request).await?;
    Ok(Json(outcome.result))
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    InternalError(String),
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::InvalidUrl(_) | HttpError::InvalidBody(_) => {
                ApiError::BadRequest(err.user_hint())
            }
            _ => {
                tracing::warn!(error = %err, "Web analysis failed");
                ApiError::InternalError(err.user_hint())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
