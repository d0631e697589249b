//! Normalized cookie attribute map

use crate::http::Cookie;

/// Display name for a cookie whose first segment had no `=`
pub const UNKNOWN_COOKIE_NAME: &str = "Unknown";

/// Date layout used when rendering structured expiry times
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Value of a single cookie attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Valueless attribute such as `Secure` or `HttpOnly`
    Flag,
    /// `key=value` attribute, value trimmed but otherwise untouched
    Text(String),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Flag => None,
            AttrValue::Text(s) => Some(s.as_str()),
        }
    }
}

/// A cookie reduced to its name, value and lower-cased attribute keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCookie {
    name: Option<String>,
    value: Option<String>,
    /// Attributes in first-seen order; a repeated key keeps its slot and takes the last value
    attributes: Vec<(String, AttrValue)>,
}

impl ParsedCookie {
    /// Parse a raw `Set-Cookie` header value.
    ///
    /// When the first segment has no `=`, name and value are left unset and
    /// the remaining attributes are still collected.
    pub fn parse(raw: &str) -> Self {
        let mut cookie = Self::default();
        let mut parts = raw.split(';');

        if let Some(first) = parts.next() {
            if let Some((name, value)) = first.split_once('=') {
                cookie.name = Some(name.trim().to_string());
                cookie.value = Some(value.trim().to_string());
            } else {
                tracing::trace!(segment = first, "Cookie first segment has no '='");
            }
        }

        for part in parts {
            let part = part.trim();
            match part.split_once('=') {
                Some((key, value)) => {
                    cookie.insert(key.trim(), AttrValue::Text(value.trim().to_string()))
                }
                None => cookie.insert(part, AttrValue::Flag),
            }
        }

        cookie
    }

    /// Normalize a cookie from the HTTP client's structured cookie view.
    ///
    /// Boolean attributes are only inserted when set, so presence checks
    /// behave exactly as for a parsed header.
    pub fn from_jar(jar: &Cookie) -> Self {
        let mut cookie = Self {
            name: Some(jar.name.clone()),
            value: Some(jar.value.clone()),
            attributes: Vec::new(),
        };

        if let Some(domain) = &jar.domain {
            cookie.insert("domain", AttrValue::Text(domain.clone()));
        }
        if let Some(path) = &jar.path {
            cookie.insert("path", AttrValue::Text(path.clone()));
        }
        if let Some(expires) = &jar.expires {
            cookie.insert(
                "expires",
                AttrValue::Text(expires.format(RFC1123_FORMAT).to_string()),
            );
        }
        if let Some(max_age) = jar.max_age {
            cookie.insert("max-age", AttrValue::Text(max_age.to_string()));
        }
        if let Some(same_site) = &jar.same_site {
            cookie.insert("samesite", AttrValue::Text(same_site.clone()));
        }
        if jar.secure {
            cookie.insert("secure", AttrValue::Flag);
        }
        if jar.http_only {
            cookie.insert("httponly", AttrValue::Flag);
        }

        cookie
    }

    fn insert(&mut self, key: &str, value: AttrValue) {
        let key = key.to_lowercase();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Whether the first segment carried a `name=value` pair
    pub fn is_well_formed(&self) -> bool {
        self.name.is_some()
    }

    /// Look up an attribute by lower-case key
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Text value of an attribute; `None` when absent or valueless
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_text)
    }

    /// `Path` value, `/` when absent, empty when present without a value
    pub fn effective_path(&self) -> &str {
        match self.get("path") {
            None => "/",
            Some(value) => value.as_text().unwrap_or(""),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render back into `Set-Cookie` syntax with lower-cased attribute keys.
    pub fn to_header_value(&self) -> String {
        let mut segments = Vec::with_capacity(self.attributes.len() + 1);
        if let (Some(name), Some(value)) = (&self.name, &self.value) {
            segments.push(format!("{}={}", name, value));
        }
        for (key, value) in self.attributes() {
            match value {
                AttrValue::Flag => segments.push(key.to_string()),
                AttrValue::Text(text) => segments.push(format!("{}={}", key, text)),
            }
        }
        segments.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_full_cookie() {
        let cookie = ParsedCookie::parse("id=abc123; Path=/; HttpOnly; Secure; SameSite=Strict");

        assert_eq!(cookie.name(), Some("id"));
        assert_eq!(cookie.value(), Some("abc123"));
        assert_eq!(cookie.text("path"), Some("/"));
        assert_eq!(cookie.get("httponly"), Some(&AttrValue::Flag));
        assert_eq!(cookie.get("secure"), Some(&AttrValue::Flag));
        assert_eq!(cookie.text("samesite"), Some("Strict"));
    }

    #[test]
    fn test_reserialize_is_stable() {
        let first = ParsedCookie::parse("id=abc123; Path=/; HttpOnly; Secure; SameSite=Strict");
        let second = ParsedCookie::parse(&first.to_header_value());

        assert_eq!(first, second);
        assert_eq!(second.text("samesite"), Some("Strict"));
        assert_eq!(
            second.to_header_value(),
            "id=abc123; path=/; httponly; secure; samesite=Strict"
        );
    }

    #[test]
    fn test_missing_equals_in_first_segment() {
        let cookie = ParsedCookie::parse("garbage; Secure; Path=/x");

        assert_eq!(cookie.name(), None);
        assert_eq!(cookie.value(), None);
        assert!(!cookie.is_well_formed());
        assert!(cookie.has("secure"));
        assert_eq!(cookie.text("path"), Some("/x"));
    }

    #[test]
    fn test_parse_never_fails_on_odd_input() {
        for raw in ["", ";", ";;;", "=", "  ", "a", "; =; ="] {
            let _ = ParsedCookie::parse(raw);
        }
        let empty = ParsedCookie::parse("");
        assert!(!empty.is_well_formed());
        assert_eq!(empty.attributes().count(), 0);
    }

    #[test]
    fn test_effective_path() {
        assert_eq!(ParsedCookie::parse("a=1").effective_path(), "/");
        assert_eq!(ParsedCookie::parse("a=1; Path").effective_path(), "");
        assert_eq!(ParsedCookie::parse("a=1; Path=").effective_path(), "");
        assert_eq!(ParsedCookie::parse("a=1; path=/app").effective_path(), "/app");
    }

    #[test]
    fn test_value_splits_on_first_equals() {
        let cookie = ParsedCookie::parse(" token = a=b=c ; Max-Age = 60 ");

        assert_eq!(cookie.name(), Some("token"));
        assert_eq!(cookie.value(), Some("a=b=c"));
        assert_eq!(cookie.text("max-age"), Some("60"));
    }

    #[test]
    fn test_attribute_keys_lowercased_values_preserved() {
        let cookie = ParsedCookie::parse("x=1; DOMAIN=Example.COM; SameSite=LAX");

        assert_eq!(cookie.text("domain"), Some("Example.COM"));
        assert_eq!(cookie.text("samesite"), Some("LAX"));
    }

    #[test]
    fn test_repeated_attribute_last_wins() {
        let cookie = ParsedCookie::parse("x=1; Path=/a; Secure; Path=/b");

        assert_eq!(cookie.text("path"), Some("/b"));
        let keys: Vec<&str> = cookie.attributes().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["path", "secure"]);
    }

    #[test]
    fn test_invalid_values_accepted_structurally() {
        let cookie = ParsedCookie::parse("x=1; Max-Age=abc; Expires=not a date; SameSite=Maybe");

        assert_eq!(cookie.text("max-age"), Some("abc"));
        assert_eq!(cookie.text("expires"), Some("not a date"));
        assert_eq!(cookie.text("samesite"), Some("Maybe"));
    }

    #[test]
    fn test_from_jar_matches_header_shape() {
        let jar = Cookie {
            name: "id".to_string(),
            value: "abc123".to_string(),
            domain: None,
            path: Some("/".to_string()),
            expires: None,
            max_age: None,
            secure: true,
            http_only: true,
            same_site: Some("Strict".to_string()),
        };

        let from_jar = ParsedCookie::from_jar(&jar);
        let from_header = ParsedCookie::parse("id=abc123; Path=/; SameSite=Strict; Secure; HttpOnly");

        assert_eq!(from_jar.name(), from_header.name());
        assert_eq!(from_jar.value(), from_header.value());
        for key in ["path", "samesite", "secure", "httponly", "domain", "expires", "max-age"] {
            assert_eq!(from_jar.get(key), from_header.get(key), "attribute {}", key);
        }
    }

    #[test]
    fn test_from_jar_omits_false_flags() {
        let jar = Cookie {
            name: "pref".to_string(),
            value: "dark".to_string(),
            domain: Some("example.com".to_string()),
            path: None,
            expires: Some(Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap()),
            max_age: Some(3600),
            secure: false,
            http_only: false,
            same_site: None,
        };

        let cookie = ParsedCookie::from_jar(&jar);

        assert!(!cookie.has("secure"));
        assert!(!cookie.has("httponly"));
        assert!(!cookie.has("samesite"));
        assert_eq!(cookie.text("domain"), Some("example.com"));
        assert_eq!(cookie.text("expires"), Some("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(cookie.text("max-age"), Some("3600"));
    }
}
