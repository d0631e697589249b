//! Cookie security rulebook
//!
//! Each rule is a plain function over a shared [`RuleContext`]. Rules run in
//! table order and never short-circuit, so one cookie can collect findings
//! from several rules. Malformed attribute values become findings; nothing
//! here returns an error.

use std::collections::HashSet;
use std::sync::Arc;

use std::num::IntErrorKind;

use chrono::format::ParseErrorKind;
use chrono::{DateTime, NaiveDateTime, Utc};

use super::clock::{Clock, SystemClock};
use super::findings::{Finding, FindingType};
use crate::app::RulesConfig;
use crate::cookies::{AttrValue, ParsedCookie};

/// Cookie names treated as sensitive by the broad-path heuristic
pub const DEFAULT_SENSITIVE_NAMES: [&str; 4] = ["session", "auth", "token", "id"];

/// Max-Age above this is reported as a long expiration (30 days)
pub const DEFAULT_LONG_EXPIRATION_SECS: i64 = 86_400 * 30;

const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `EXPIRES_FORMAT` without the weekday
const EXPIRES_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S GMT";

/// Stand-in value for a valueless `SameSite` attribute
const SAMESITE_FLAG_VALUE: &str = "true";

const VALID_SAMESITE: [&str; 3] = ["strict", "lax", "none"];

const HOST_PREFIX: &str = "__Host-";
const SECURE_PREFIX: &str = "__Secure-";

/// Tunable inputs of the rulebook
#[derive(Debug, Clone)]
pub struct RulePolicy {
    /// Lower-cased names for the broad-path check
    sensitive_names: HashSet<String>,
    long_expiration_secs: i64,
}

impl RulePolicy {
    pub fn new<I, S>(sensitive_names: I, long_expiration_secs: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            sensitive_names: sensitive_names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
            long_expiration_secs,
        }
    }

    pub fn is_sensitive_name(&self, name: &str) -> bool {
        self.sensitive_names.contains(&name.to_lowercase())
    }
}

impl Default for RulePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_NAMES, DEFAULT_LONG_EXPIRATION_SECS)
    }
}

impl From<&RulesConfig> for RulePolicy {
    fn from(config: &RulesConfig) -> Self {
        Self::new(&config.sensitive_names, config.long_expiration_secs)
    }
}

/// Everything a rule may look at
pub struct RuleContext<'a> {
    pub name: &'a str,
    pub cookie: &'a ParsedCookie,
    pub secure_transport: bool,
    pub now: DateTime<Utc>,
    pub policy: &'a RulePolicy,
}

impl RuleContext<'_> {
    fn effective_path(&self) -> &str {
        self.cookie.effective_path()
    }

    /// Non-empty text value of an attribute
    fn non_empty(&self, key: &str) -> Option<&str> {
        self.cookie.text(key).filter(|v| !v.is_empty())
    }
}

type CheckFn = fn(&RuleContext<'_>, &mut Vec<Finding>);

/// A named entry of the rulebook
pub struct Rule {
    pub id: &'static str,
    pub check: CheckFn,
}

/// The rulebook, in evaluation order
pub const RULES: &[Rule] = &[
    Rule { id: "httponly", check: check_httponly },
    Rule { id: "secure", check: check_secure },
    Rule { id: "samesite", check: check_samesite },
    Rule { id: "max-age", check: check_max_age },
    Rule { id: "expires", check: check_expires },
    Rule { id: "path-scope", check: check_path_scope },
    Rule { id: "host-prefix", check: check_host_prefix },
    Rule { id: "secure-prefix", check: check_secure_prefix },
];

/// Run every rule against one cookie.
pub fn evaluate(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for rule in RULES {
        let before = findings.len();
        (rule.check)(ctx, &mut findings);
        if findings.len() > before {
            tracing::trace!(rule = rule.id, cookie = ctx.name, "Rule matched");
        }
    }
    findings
}

fn check_httponly(ctx: &RuleContext<'_>, findings: &mut Vec<Finding>) {
    if !ctx.cookie.has("httponly") {
        findings.push(Finding::new(
            FindingType::MissingHttponly,
            &format!("Cookie {} lacks HttpOnly flag", ctx.name),
        ));
    }
}

fn check_secure(ctx: &RuleContext<'_>, findings: &mut Vec<Finding>) {
    if ctx.cookie.has("secure") {
        return;
    }
    if ctx.secure_transport {
        findings.push(Finding::new(
            FindingType::MissingSecureHttps,
            &format!("Cookie {} lacks Secure flag on HTTPS", ctx.name),
        ));
    } else {
        findings.push(Finding::new(
            FindingType::MissingSecure,
            &format!("Cookie {} lacks Secure flag", ctx.name),
        ));
    }
}

fn check_samesite(ctx: &RuleContext<'_>, findings: &mut Vec<Finding>) {
    let same_site = match ctx.cookie.get("samesite") {
        Some(AttrValue::Flag) => Some(SAMESITE_FLAG_VALUE),
        Some(AttrValue::Text(text)) if !text.is_empty() => Some(text.as_str()),
        _ => None,
    };
    let Some(same_site) = same_site else {
        findings.push(Finding::new(
            FindingType::MissingSamesite,
            &format!("Cookie {} lacks SameSite attribute", ctx.name),
        ));
        return;
    };

    let same_site = same_site.to_lowercase();
    if !VALID_SAMESITE.contains(&same_site.as_str()) {
        findings.push(Finding::new(
            FindingType::InvalidSamesite,
            &format!(
                "Cookie {} has invalid SameSite value ({})",
                ctx.name, same_site
            ),
        ));
    }
}

fn check_max_age(ctx: &RuleContext<'_>, findings: &mut Vec<Finding>) {
    let Some(raw) = ctx.non_empty("max-age") else {
        return;
    };

    let long = |seconds: &str| {
        Finding::new(
            FindingType::LongExpiration,
            &format!(
                "Cookie {} has long expiration time ({} seconds)",
                ctx.name, seconds
            ),
        )
    };
    let negative = || {
        Finding::new(
            FindingType::NegativeMaxAge,
            &format!("Cookie {} has negative Max-Age value", ctx.name),
        )
    };

    match raw.parse::<i64>() {
        Ok(seconds) if seconds > ctx.policy.long_expiration_secs => {
            findings.push(long(&seconds.to_string()));
        }
        Ok(seconds) if seconds < 0 => findings.push(negative()),
        Ok(0) => {
            findings.push(Finding::new(
                FindingType::SessionCookie,
                &format!("Cookie {} has Max-Age=0 (session cookie)", ctx.name),
            ));
        }
        Ok(_) => {}
        // Integers beyond i64 are still integers
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
            findings.push(long(raw.trim_start_matches('+')));
        }
        Err(e) if *e.kind() == IntErrorKind::NegOverflow => findings.push(negative()),
        Err(_) => {
            findings.push(Finding::new(
                FindingType::InvalidMaxAge,
                &format!("Cookie {} has invalid Max-Age value", ctx.name),
            ));
        }
    }
}

fn check_expires(ctx: &RuleContext<'_>, findings: &mut Vec<Finding>) {
    let Some(raw) = ctx.non_empty("expires") else {
        return;
    };

    match parse_expires(raw) {
        Ok(expires) if expires.and_utc() < ctx.now => {
            findings.push(Finding::new(
                FindingType::ExpiredCookie,
                &format!("Cookie {} has expired date", ctx.name),
            ));
        }
        Ok(_) => {}
        Err(_) => {
            findings.push(Finding::new(
                FindingType::InvalidExpires,
                &format!("Cookie {} has invalid Expires date format", ctx.name),
            ));
        }
    }
}

/// Parse an RFC 1123 date; a weekday that disagrees with the date is ignored.
fn parse_expires(raw: &str) -> chrono::ParseResult<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(raw, EXPIRES_FORMAT) {
        Err(e) if e.kind() == ParseErrorKind::Impossible => match raw.split_once(", ") {
            Some((_, date)) => NaiveDateTime::parse_from_str(date, EXPIRES_DATE_FORMAT),
            None => Err(e),
        },
        parsed => parsed,
    }
}

fn check_path_scope(ctx: &RuleContext<'_>, findings: &mut Vec<Finding>) {
    if ctx.effective_path() == "/" && ctx.policy.is_sensitive_name(ctx.name) {
        findings.push(Finding::new(
            FindingType::BroadPath,
            &format!("Cookie {} has overly broad path (/)", ctx.name),
        ));
    }
}

fn check_host_prefix(ctx: &RuleContext<'_>, findings: &mut Vec<Finding>) {
    if !ctx.name.starts_with(HOST_PREFIX) {
        return;
    }
    if !ctx.cookie.has("secure") {
        findings.push(Finding::new(
            FindingType::HostPrefixSecure,
            &format!(
                "Cookie {} uses __Host- prefix but lacks Secure flag",
                ctx.name
            ),
        ));
    }
    if ctx.effective_path() != "/" {
        findings.push(Finding::new(
            FindingType::HostPrefixPath,
            &format!("Cookie {} uses __Host- prefix but path is not /", ctx.name),
        ));
    }
    if ctx.cookie.has("domain") {
        findings.push(Finding::new(
            FindingType::HostPrefixDomain,
            &format!(
                "Cookie {} uses __Host- prefix but has domain attribute",
                ctx.name
            ),
        ));
    }
}

fn check_secure_prefix(ctx: &RuleContext<'_>, findings: &mut Vec<Finding>) {
    if ctx.name.starts_with(SECURE_PREFIX) && !ctx.cookie.has("secure") {
        findings.push(Finding::new(
            FindingType::SecurePrefixSecure,
            &format!(
                "Cookie {} uses __Secure- prefix but lacks Secure flag",
                ctx.name
            ),
        ));
    }
}

/// Rule policy plus the clock used for expiry checks.
///
/// Stateless apart from its inputs; one instance can be shared across
/// concurrent analyses.
#[derive(Clone)]
pub struct RuleBook {
    policy: RulePolicy,
    clock: Arc<dyn Clock>,
}

impl RuleBook {
    pub fn new(policy: RulePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: RulePolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Evaluate one cookie.
    pub fn evaluate(
        &self,
        name: &str,
        cookie: &ParsedCookie,
        secure_transport: bool,
    ) -> Vec<Finding> {
        let ctx = RuleContext {
            name,
            cookie,
            secure_transport,
            now: self.clock.now(),
            policy: &self.policy,
        };
        let findings = evaluate(&ctx);
        tracing::debug!(cookie = name, findings = findings.len(), "Evaluated cookie");
        findings
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::new(RulePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::clock::FixedClock;
    use crate::scanner::findings::Severity;
    use chrono::TimeZone;

    fn rulebook() -> RuleBook {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        RuleBook::with_clock(RulePolicy::default(), Arc::new(FixedClock(now)))
    }

    fn kinds(raw: &str, https: bool) -> Vec<FindingType> {
        let cookie = ParsedCookie::parse(raw);
        let name = cookie.name().unwrap_or("").to_string();
        rulebook()
            .evaluate(&name, &cookie, https)
            .into_iter()
            .map(|f| f.kind)
            .collect()
    }

    /// Findings other than the flag/samesite baseline
    fn extra_kinds(raw: &str) -> Vec<FindingType> {
        let full = format!("{}; Secure; HttpOnly; SameSite=Lax", raw);
        kinds(&full, true)
    }

    #[test]
    fn test_hardened_cookie_is_clean() {
        assert!(kinds("prefs=1; Secure; HttpOnly; SameSite=Strict", true).is_empty());
    }

    #[test]
    fn test_bare_session_cookie_over_https() {
        assert_eq!(
            kinds("session=abc", true),
            vec![
                FindingType::MissingHttponly,
                FindingType::MissingSecureHttps,
                FindingType::MissingSamesite,
                FindingType::BroadPath,
            ]
        );
    }

    #[test]
    fn test_missing_secure_over_http_is_warning() {
        let cookie = ParsedCookie::parse("prefs=1; HttpOnly; SameSite=Lax");
        let findings = rulebook().evaluate("prefs", &cookie, false);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingType::MissingSecure);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].message, "⚠️ Warning: Cookie prefs lacks Secure flag");
    }

    #[test]
    fn test_samesite_values() {
        assert!(extra_kinds("a=1").is_empty());
        assert!(kinds("a=1; Secure; HttpOnly; SameSite=NONE", true).is_empty());
        assert_eq!(
            kinds("a=1; Secure; HttpOnly; SameSite=", true),
            vec![FindingType::MissingSamesite]
        );

        let cookie = ParsedCookie::parse("a=1; Secure; HttpOnly; SameSite");
        let findings = rulebook().evaluate("a", &cookie, true);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingType::InvalidSamesite);
        assert_eq!(
            findings[0].message,
            "❌ Error: Cookie a has invalid SameSite value (true)"
        );

        let cookie = ParsedCookie::parse("a=1; Secure; HttpOnly; SameSite=Sometimes");
        let findings = rulebook().evaluate("a", &cookie, true);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingType::InvalidSamesite);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(
            findings[0].message,
            "❌ Error: Cookie a has invalid SameSite value (sometimes)"
        );
    }

    #[test]
    fn test_max_age_branches() {
        assert_eq!(extra_kinds("a=1; Max-Age=-5"), vec![FindingType::NegativeMaxAge]);
        assert_eq!(extra_kinds("a=1; Max-Age=0"), vec![FindingType::SessionCookie]);
        assert_eq!(extra_kinds("a=1; Max-Age=3000000"), vec![FindingType::LongExpiration]);
        assert_eq!(extra_kinds("a=1; Max-Age=abc"), vec![FindingType::InvalidMaxAge]);
        assert!(extra_kinds("a=1; Max-Age=2592000").is_empty());
        assert!(extra_kinds("a=1; Max-Age=3600").is_empty());
        assert!(extra_kinds("a=1; Max-Age=").is_empty());
    }

    #[test]
    fn test_max_age_beyond_i64() {
        assert_eq!(
            extra_kinds("a=1; Max-Age=99999999999999999999"),
            vec![FindingType::LongExpiration]
        );
        assert_eq!(
            extra_kinds("a=1; Max-Age=-99999999999999999999"),
            vec![FindingType::NegativeMaxAge]
        );
        assert_eq!(
            extra_kinds("a=1; Max-Age=99999999999999999999x"),
            vec![FindingType::InvalidMaxAge]
        );

        let cookie = ParsedCookie::parse(
            "a=1; Secure; HttpOnly; SameSite=Lax; Max-Age=99999999999999999999",
        );
        let findings = rulebook().evaluate("a", &cookie, true);
        assert_eq!(
            findings[0].message,
            "⚠️ Warning: Cookie a has long expiration time (99999999999999999999 seconds)"
        );
    }

    #[test]
    fn test_long_expiration_message() {
        let cookie = ParsedCookie::parse("a=1; Secure; HttpOnly; SameSite=Lax; Max-Age=3000000");
        let findings = rulebook().evaluate("a", &cookie, true);

        assert_eq!(
            findings[0].message,
            "⚠️ Warning: Cookie a has long expiration time (3000000 seconds)"
        );
    }

    #[test]
    fn test_custom_long_expiration_threshold() {
        let policy = RulePolicy::new(DEFAULT_SENSITIVE_NAMES, 3600);
        let book = RuleBook::with_clock(policy, Arc::new(FixedClock(Utc::now())));
        let cookie = ParsedCookie::parse("a=1; Secure; HttpOnly; SameSite=Lax; Max-Age=7200");

        let findings = book.evaluate("a", &cookie, true);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingType::LongExpiration);
    }

    #[test]
    fn test_expires_checks() {
        assert_eq!(
            extra_kinds("a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT"),
            vec![FindingType::ExpiredCookie]
        );
        assert!(extra_kinds("a=1; Expires=Fri, 01 Jan 2100 00:00:00 GMT").is_empty());
        assert_eq!(
            extra_kinds("a=1; Expires=2015-10-21"),
            vec![FindingType::InvalidExpires]
        );
        assert!(extra_kinds("a=1; Expires=").is_empty());
    }

    #[test]
    fn test_expires_weekday_mismatch_is_ignored() {
        // 21 Oct 2015 was a Wednesday
        assert_eq!(
            extra_kinds("a=1; Expires=Mon, 21 Oct 2015 07:28:00 GMT"),
            vec![FindingType::ExpiredCookie]
        );
        assert!(extra_kinds("a=1; Expires=Mon, 01 Jan 2100 00:00:00 GMT").is_empty());
        assert_eq!(
            extra_kinds("a=1; Expires=Xyz, 21 Oct 2015 07:28:00 GMT"),
            vec![FindingType::InvalidExpires]
        );
        assert_eq!(
            extra_kinds("a=1; Expires=Mon, 32 Oct 2015 07:28:00 GMT"),
            vec![FindingType::InvalidExpires]
        );
    }

    #[test]
    fn test_expiry_uses_injected_clock() {
        let cookie = ParsedCookie::parse(
            "a=1; Secure; HttpOnly; SameSite=Lax; Expires=Sat, 15 Jun 2030 00:00:00 GMT",
        );
        let before = Utc.with_ymd_and_hms(2030, 6, 14, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2030, 6, 16, 0, 0, 0).unwrap();

        let early = RuleBook::with_clock(RulePolicy::default(), Arc::new(FixedClock(before)));
        let late = RuleBook::with_clock(RulePolicy::default(), Arc::new(FixedClock(after)));

        assert!(early.evaluate("a", &cookie, true).is_empty());
        assert_eq!(
            late.evaluate("a", &cookie, true)[0].kind,
            FindingType::ExpiredCookie
        );
    }

    #[test]
    fn test_max_age_and_expires_both_reported() {
        assert_eq!(
            extra_kinds("a=1; Max-Age=abc; Expires=nope"),
            vec![FindingType::InvalidMaxAge, FindingType::InvalidExpires]
        );
    }

    #[test]
    fn test_broad_path_only_for_sensitive_names() {
        assert_eq!(extra_kinds("TOKEN=1"), vec![FindingType::BroadPath]);
        assert_eq!(extra_kinds("auth=1; Path=/"), vec![FindingType::BroadPath]);
        assert!(extra_kinds("auth=1; Path=/api").is_empty());
        assert!(extra_kinds("session_id=1").is_empty());
    }

    #[test]
    fn test_sensitive_names_are_configurable() {
        let policy = RulePolicy::new(["sid"], DEFAULT_LONG_EXPIRATION_SECS);
        let book = RuleBook::with_clock(policy, Arc::new(FixedClock(Utc::now())));
        let sid = ParsedCookie::parse("SID=1; Secure; HttpOnly; SameSite=Lax");
        let session = ParsedCookie::parse("session=1; Secure; HttpOnly; SameSite=Lax");

        assert_eq!(book.evaluate("SID", &sid, true)[0].kind, FindingType::BroadPath);
        assert!(book.evaluate("session", &session, true).is_empty());
    }

    #[test]
    fn test_host_prefix_path_and_domain() {
        let found = kinds(
            "__Host-x=1; Secure; HttpOnly; SameSite=Lax; Path=/admin; Domain=example.com",
            true,
        );
        assert_eq!(
            found,
            vec![FindingType::HostPrefixPath, FindingType::HostPrefixDomain]
        );
        assert!(!found.contains(&FindingType::HostPrefixSecure));
    }

    #[test]
    fn test_host_prefix_all_three() {
        let found = kinds("__Host-x=1; HttpOnly; SameSite=Lax; Path=/a; Domain=.example.com", false);
        assert_eq!(
            found,
            vec![
                FindingType::MissingSecure,
                FindingType::HostPrefixSecure,
                FindingType::HostPrefixPath,
                FindingType::HostPrefixDomain,
            ]
        );
    }

    #[test]
    fn test_host_prefix_is_case_sensitive() {
        assert!(extra_kinds("__host-x=1; Path=/admin; Domain=example.com").is_empty());
        assert!(extra_kinds("__Host-x=1").is_empty());
    }

    #[test]
    fn test_secure_prefix_without_secure() {
        assert_eq!(
            kinds("__Secure-y=1", true),
            vec![
                FindingType::MissingHttponly,
                FindingType::MissingSecureHttps,
                FindingType::MissingSamesite,
                FindingType::SecurePrefixSecure,
            ]
        );
        assert_eq!(
            kinds("__Secure-y=1", false),
            vec![
                FindingType::MissingHttponly,
                FindingType::MissingSecure,
                FindingType::MissingSamesite,
                FindingType::SecurePrefixSecure,
            ]
        );
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let cookie = ParsedCookie::parse("__Host-session=x; Max-Age=abc; Expires=bad; SameSite=odd");
        let book = rulebook();

        let first = book.evaluate("__Host-session", &cookie, true);
        let second = book.evaluate("__Host-session", &cookie, true);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rule_table_order() {
        let ids: Vec<&str> = RULES.iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![
                "httponly",
                "secure",
                "samesite",
                "max-age",
                "expires",
                "path-scope",
                "host-prefix",
                "secure-prefix",
            ]
        );
    }
}
