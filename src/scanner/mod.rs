//! Cookie security scanner
//!
//! Runs the rulebook over every cookie a response sets.

mod clock;
mod engine;
mod findings;
pub mod rules;

pub use engine::{CookieScanner, CookieSource, MalformedCookiePolicy};
pub use findings::{Finding, FindingType, Severity};
