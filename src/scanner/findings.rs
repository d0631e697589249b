//! Cookie security findings

use serde::{Deserialize, Serialize};

/// Severity level for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Warning => "⚠️",
            Severity::Error => "❌",
            Severity::Critical => "🔥",
        }
    }

    /// All severities, most severe first
    pub fn all() -> [Severity; 3] {
        [Severity::Critical, Severity::Error, Severity::Warning]
    }
}

/// Machine-readable finding identifier
///
/// The serialized form (`missing_httponly`, ...) is stable and consumed by
/// report readers for filtering, so variants must never be renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    MissingHttponly,
    MissingSecureHttps,
    MissingSecure,
    MissingSamesite,
    InvalidSamesite,
    InvalidMaxAge,
    LongExpiration,
    NegativeMaxAge,
    SessionCookie,
    InvalidExpires,
    ExpiredCookie,
    BroadPath,
    HostPrefixSecure,
    HostPrefixPath,
    HostPrefixDomain,
    SecurePrefixSecure,
}

impl FindingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingType::MissingHttponly => "missing_httponly",
            FindingType::MissingSecureHttps => "missing_secure_https",
            FindingType::MissingSecure => "missing_secure",
            FindingType::MissingSamesite => "missing_samesite",
            FindingType::InvalidSamesite => "invalid_samesite",
            FindingType::InvalidMaxAge => "invalid_max_age",
            FindingType::LongExpiration => "long_expiration",
            FindingType::NegativeMaxAge => "negative_max_age",
            FindingType::SessionCookie => "session_cookie",
            FindingType::InvalidExpires => "invalid_expires",
            FindingType::ExpiredCookie => "expired_cookie",
            FindingType::BroadPath => "broad_path",
            FindingType::HostPrefixSecure => "host_prefix_secure",
            FindingType::HostPrefixPath => "host_prefix_path",
            FindingType::HostPrefixDomain => "host_prefix_domain",
            FindingType::SecurePrefixSecure => "secure_prefix_secure",
        }
    }

    /// Each finding type carries exactly one severity.
    pub fn severity(&self) -> Severity {
        match self {
            FindingType::MissingSecureHttps => Severity::Critical,
            FindingType::InvalidSamesite
            | FindingType::InvalidMaxAge
            | FindingType::NegativeMaxAge
            | FindingType::HostPrefixSecure
            | FindingType::HostPrefixPath
            | FindingType::HostPrefixDomain
            | FindingType::SecurePrefixSecure => Severity::Error,
            FindingType::MissingHttponly
            | FindingType::MissingSecure
            | FindingType::MissingSamesite
            | FindingType::LongExpiration
            | FindingType::SessionCookie
            | FindingType::InvalidExpires
            | FindingType::ExpiredCookie
            | FindingType::BroadPath => Severity::Warning,
        }
    }

    /// Fixed remediation advice. Downstream consumers match on this text.
    pub fn remediation(&self) -> &'static str {
        match self {
            FindingType::MissingHttponly => "Add HttpOnly flag to prevent XSS attacks",
            FindingType::MissingSecureHttps => "Add Secure flag to prevent cookie interception",
            FindingType::MissingSecure => "Consider adding Secure flag for better security",
            FindingType::MissingSamesite => "Add SameSite=Strict or SameSite=Lax to prevent CSRF",
            FindingType::InvalidSamesite => "Use valid SameSite values: Strict, Lax, or None",
            FindingType::InvalidMaxAge => "Use valid numeric value for Max-Age",
            FindingType::LongExpiration => "Consider shorter expiration times for better security",
            FindingType::NegativeMaxAge => "Max-Age must be a positive number",
            FindingType::SessionCookie => {
                "This is a session cookie that will be deleted when browser closes"
            }
            FindingType::InvalidExpires => {
                "Use RFC 1123 date format: Mon, 02 Jan 2006 15:04:05 GMT"
            }
            FindingType::ExpiredCookie => "Cookie will be ignored by browsers",
            FindingType::BroadPath => "Consider restricting path to specific endpoints",
            FindingType::HostPrefixSecure => "__Host- cookies must have Secure flag",
            FindingType::HostPrefixPath => "__Host- cookies must have path=/",
            FindingType::HostPrefixDomain => "__Host- cookies must not have domain attribute",
            FindingType::SecurePrefixSecure => "__Secure- cookies must have Secure flag",
        }
    }
}

/// A single cookie security finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Severity level
    pub severity: Severity,

    /// Stable identifier
    #[serde(rename = "type")]
    pub kind: FindingType,

    /// Human-readable message, prefixed with the severity label
    pub message: String,

    /// Remediation advice
    pub remediation: String,
}

impl Finding {
    /// Create a finding; `detail` is the sentence after the severity label.
    pub fn new(kind: FindingType, detail: &str) -> Self {
        let severity = kind.severity();
        Self {
            severity,
            kind,
            message: format!("{} {}: {}", severity.icon(), severity.name(), detail),
            remediation: kind.remediation().to_string(),
        }
    }
}
