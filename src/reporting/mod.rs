//! Report Generation Module
//!
//! Assembles per-run analysis results and renders them as:
//! - a console table plus severity summary
//! - a plain-text report file
//! - a JSON document (also the web form's response body)

pub mod formats;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cookies::ParsedCookie;
use crate::error::ExportError;
use crate::scanner::{Finding, Severity};

/// One analyzed cookie with the fields shown to users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieReport {
    pub name: String,
    pub value: String,
    pub httponly: bool,
    pub secure: bool,
    /// Raw SameSite value, `None` when unset
    pub samesite: String,
    /// Path, `/` when unset, empty when given without a value
    pub path: String,
    /// Expires value, else Max-Age, else empty
    pub expires: String,
    pub warnings: Vec<Finding>,
}

impl CookieReport {
    pub fn new(name: &str, cookie: &ParsedCookie, warnings: Vec<Finding>) -> Self {
        let expires = cookie
            .text("expires")
            .filter(|v| !v.is_empty())
            .or_else(|| cookie.text("max-age"))
            .unwrap_or("");

        Self {
            name: name.to_string(),
            value: cookie.value().unwrap_or("").to_string(),
            httponly: cookie.has("httponly"),
            secure: cookie.has("secure"),
            samesite: cookie.text("samesite").unwrap_or("None").to_string(),
            path: cookie.effective_path().to_string(),
            expires: expires.to_string(),
            warnings,
        }
    }
}

/// Run-level counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_cookies: usize,
    pub total_warnings: usize,
    pub critical_warnings: usize,
    pub error_warnings: usize,
    pub warning_warnings: usize,
}

impl ReportSummary {
    /// Calculate summary from findings
    pub fn from_findings(total_cookies: usize, findings: &[Finding]) -> Self {
        let count = |severity: Severity| findings.iter().filter(|f| f.severity == severity).count();

        Self {
            total_cookies,
            total_warnings: findings.len(),
            critical_warnings: count(Severity::Critical),
            error_warnings: count(Severity::Error),
            warning_warnings: count(Severity::Warning),
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical_warnings,
            Severity::Error => self.error_warnings,
            Severity::Warning => self.warning_warnings,
        }
    }
}

/// Complete result of analyzing one response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Target URL
    pub url: String,
    /// When the analysis ran (RFC 3339, UTC)
    pub timestamp: String,
    /// Cookies in the order they were analyzed
    pub cookies: Vec<CookieReport>,
    /// All findings, cookie by cookie
    pub warnings: Vec<Finding>,
    pub summary: ReportSummary,
}

impl AnalysisResult {
    pub fn new(url: &str, timestamp: DateTime<Utc>, cookies: Vec<CookieReport>) -> Self {
        let warnings: Vec<Finding> = cookies
            .iter()
            .flat_map(|c| c.warnings.iter().cloned())
            .collect();
        let summary = ReportSummary::from_findings(cookies.len(), &warnings);

        Self {
            url: url.to_string(),
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            cookies,
            warnings,
            summary,
        }
    }

    /// Export to JSON format
    pub fn to_json(&self) -> Result<String, ExportError> {
        formats::json::generate(self)
    }

    /// Export to plain-text format
    pub fn to_text(&self) -> String {
        formats::text::generate(self)
    }

    /// Save report to file in the given format
    pub fn save(&self, path: &Path, format: ReportFormat) -> Result<(), ExportError> {
        let content = match format {
            ReportFormat::Json => self.to_json()?,
            ReportFormat::Text => self.to_text(),
        };

        std::fs::write(path, content).map_err(|source| ExportError::Write {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(path = %path.display(), format = format.extension(), "Saved report");
        Ok(())
    }
}

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Text,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Text => "txt",
        }
    }
}
