//! Scan engine orchestration
//!
//! Gathers the cookies a response sets, runs each through the rulebook and
//! assembles the analysis result.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::rules::{RuleBook, RulePolicy};
use crate::app::RulesConfig;
use crate::cookies::{ParsedCookie, UNKNOWN_COOKIE_NAME};
use crate::error::HttpError;
use crate::http::{HttpClient, Request, Response};
use crate::reporting::{AnalysisResult, CookieReport};

/// Which cookie representation(s) of a response to analyze
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieSource {
    /// Raw `Set-Cookie` header values only
    Headers,
    /// Cookies as understood by the HTTP client only
    Jar,
    /// Raw headers first, then client cookies with names not yet seen
    #[default]
    Merged,
}

/// Handling of `Set-Cookie` values whose first segment has no `=`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedCookiePolicy {
    /// Analyze it under the name `Unknown`
    #[default]
    Report,
    /// Drop it
    Skip,
}

/// Outcome of a fetch-and-analyze run
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// HTTP status of the analyzed response
    pub status: u16,
    pub result: AnalysisResult,
}

/// Cookie scanner
#[derive(Clone)]
pub struct CookieScanner {
    rulebook: RuleBook,
    source: CookieSource,
    malformed: MalformedCookiePolicy,
}

impl CookieScanner {
    pub fn new(rulebook: RuleBook, source: CookieSource, malformed: MalformedCookiePolicy) -> Self {
        Self {
            rulebook,
            source,
            malformed,
        }
    }

    pub fn from_config(config: &RulesConfig) -> Self {
        Self::new(
            RuleBook::new(RulePolicy::from(config)),
            config.cookie_source,
            config.malformed_cookies,
        )
    }

    /// Analyze the cookies a response sets for the given request
    pub fn scan(&self, request: &Request, response: &Response) -> AnalysisResult {
        let secure_transport = request.is_https();

        if !response.has_cookies() {
            tracing::info!(url = %request.url, "No cookies found in response");
        }

        let cookies: Vec<CookieReport> = self
            .collect(response)
            .into_iter()
            .map(|(name, cookie)| {
                let findings = self.rulebook.evaluate(&name, &cookie, secure_transport);
                for finding in &findings {
                    tracing::debug!(
                        cookie = %name,
                        finding = finding.kind.as_str(),
                        severity = finding.severity.as_str(),
                        "Cookie finding"
                    );
                }
                CookieReport::new(&name, &cookie, findings)
            })
            .collect();

        let result = AnalysisResult::new(&request.url, self.rulebook.now(), cookies);

        tracing::info!(
            url = %request.url,
            cookies = result.summary.total_cookies,
            warnings = result.summary.total_warnings,
            critical = result.summary.critical_warnings,
            "Analysis complete"
        );

        result
    }

    /// Send the request and analyze the response
    pub async fn analyze(
        &self,
        client: &HttpClient,
        request: &Request,
    ) -> Result<ScanOutcome, HttpError> {
        let response = client.execute(request).await?;
        tracing::debug!(
            status = response.status,
            duration_ms = response.duration_ms,
            "Fetched target"
        );
        if response.status != 200 {
            tracing::warn!(
                status = response.status,
                reason = %response.status_text,
                url = %request.url,
                "Unexpected status code"
            );
        }

        Ok(ScanOutcome {
            status: response.status,
            result: self.scan(request, &response),
        })
    }

    /// Cookies to analyze, in analysis order, paired with their display names
    fn collect(&self, response: &Response) -> Vec<(String, ParsedCookie)> {
        let mut out = Vec::new();

        if self.source != CookieSource::Jar {
            for raw in &response.set_cookies {
                let cookie = ParsedCookie::parse(raw);
                if !cookie.is_well_formed() && self.malformed == MalformedCookiePolicy::Skip {
                    tracing::warn!(header = %raw, "Skipping malformed Set-Cookie header");
                    continue;
                }
                let name = cookie.name().unwrap_or(UNKNOWN_COOKIE_NAME).to_string();
                out.push((name, cookie));
            }
        }

        if self.source != CookieSource::Headers {
            let seen: HashSet<String> = out.iter().map(|(name, _)| name.clone()).collect();
            for jar in &response.cookies {
                if self.source == CookieSource::Merged && seen.contains(&jar.name) {
                    continue;
                }
                let cookie = ParsedCookie::from_jar(jar);
                tracing::trace!(cookie = %cookie.to_header_value(), "Normalized client cookie");
                out.push((jar.name.clone(), cookie));
            }
        }

        out
    }
}

impl Default for CookieScanner {
    fn default() -> Self {
        Self::new(
            RuleBook::default(),
            CookieSource::default(),
            MalformedCookiePolicy::default(),
        )
    }
}
