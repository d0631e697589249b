//! Cookie attribute parsing
//!
//! Both cookie sources a response offers are normalized into one
//! [`ParsedCookie`] shape before any rule sees them:
//!
//! - raw `Set-Cookie` header values ([`ParsedCookie::parse`])
//! - the HTTP client's structured cookie view ([`ParsedCookie::from_jar`])
//!
//! Parsing never fails. Invalid dates, non-numeric `Max-Age` values and
//! unknown `SameSite` values are stored as-is and judged by the rule engine.

mod parsed;

pub use parsed::{AttrValue, ParsedCookie, UNKNOWN_COOKIE_NAME};
