use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("scheme pattern is valid"));

static BARE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("domain pattern is valid")
});

/// Reasons a raw address could not be turned into a crawlable URL
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("empty address")]
    Empty,

    #[error("no scheme could be inferred for '{0}'")]
    NoScheme(String),

    #[error("invalid address '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported address '{0}' (needs http(s) scheme and a host)")]
    Unsupported(String),
}

/// Turns a raw address into an absolute http(s) URL without fragment.
///
/// Addresses carrying a scheme pass through. Without a base, a bare domain
/// such as `example.com` gets `https://` prepended; with a base, anything
/// else is resolved relative to it.
pub fn normalize(raw: &str, base: Option<&Url>) -> Result<Url, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let parsed = if SCHEME_PREFIX.is_match(trimmed) {
        Url::parse(trimmed)
    } else if let Some(base) = base {
        base.join(trimmed)
    } else if BARE_DOMAIN.is_match(trimmed) {
        Url::parse(&format!("https://{}", trimmed))
    } else {
        return Err(NormalizeError::NoScheme(trimmed.to_string()));
    };

    let mut url = parsed.map_err(|source| NormalizeError::Invalid {
        input: trimmed.to_string(),
        source,
    })?;

    if !is_crawlable(&url) {
        return Err(NormalizeError::Unsupported(trimmed.to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}

/// Like [`normalize`] but logs and drops failures
pub fn normalize_or_skip(raw: &str, base: Option<&Url>) -> Option<Url> {
    match normalize(raw, base) {
        Ok(url) => Some(url),
        Err(e) => {
            ::log::debug!("Dropping address: {}", e);
            None
        }
    }
}

/// Whether the URL has an http(s) scheme and a host
pub fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
}

/// Same scheme, host and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_domain_gets_https() {
        let url = normalize("example.com", None).unwrap();
        assert_eq!(url, Url::parse("https://example.com").unwrap());
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_absolute_passes_through_without_fragment() {
        let url = normalize("  http://example.com/a?b=1#section ", None).unwrap();
        assert_eq!(url.as_str(), "http://example.com/a?b=1");
    }

    #[test]
    fn test_uppercase_scheme_is_recognised() {
        let url = normalize("HTTPS://Example.com/x", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/x");
    }

    #[test]
    fn test_relative_resolved_against_base() {
        let base = Url::parse("https://example.com/docs/index.html").unwrap();
        let url = normalize("page.html#top", Some(&base)).unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/page.html");

        let url = normalize("/root", Some(&base)).unwrap();
        assert_eq!(url.as_str(), "https://example.com/root");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(normalize("   ", None), Err(NormalizeError::Empty));
        assert!(matches!(
            normalize("not a url", None),
            Err(NormalizeError::NoScheme(_))
        ));

        let base = Url::parse("https://example.com/").unwrap();
        assert!(matches!(
            normalize("mailto:someone@example.com", Some(&base)),
            Err(NormalizeError::Unsupported(_))
        ));
        assert!(matches!(
            normalize("javascript:void(0)", Some(&base)),
            Err(NormalizeError::Unsupported(_))
        ));
        assert!(matches!(
            normalize("http://", None),
            Err(NormalizeError::Invalid { .. })
        ));
    }

    #[test]
    fn test_same_origin() {
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://example.com/b?x=1").unwrap();
        let c = Url::parse("http://example.com/a").unwrap();
        let d = Url::parse("https://example.com:8443/a").unwrap();
        let e = Url::parse("https://sub.example.com/a").unwrap();

        assert!(same_origin(&a, &b));
        assert!(!same_origin(&a, &c));
        assert!(!same_origin(&a, &d));
        assert!(!same_origin(&a, &e));
    }
}
