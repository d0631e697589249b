//! HTTP client module
//!
//! Issues the single request an analysis run needs and captures the
//! cookies the response sets.

mod client;
mod request;
mod response;

pub use client::HttpClient;
pub use request::{normalize_url, parse_header_lines, parse_json_body, HttpMethod, Request};
pub use response::{Cookie, Response};
