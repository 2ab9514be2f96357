use crate::UrlError;
use url::Url;

/// Schemes whose references never point at a fetchable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Parses a crawlable URL
///
/// Unlike a canonicalizing normalizer this keeps the path exactly as the
/// server published it: `/std/` and `/std` resolve relative links differently
/// and map to different local files. Only the fragment is dropped, because it
/// never changes the document the server returns.
///
/// # Examples
///
/// ```
/// use shiori::url::normalize_url;
///
/// let url = normalize_url("https://Docs.Example.com/guide/#install").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/guide/");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    check_crawlable(url)
}

/// Resolves a reference found on a page against the page URL
///
/// Returns `None` for references that should be dropped: empty or
/// fragment-only references, script/mail/phone/data pseudo-links, references
/// that fail to resolve, and anything that does not resolve to HTTP(S).
pub fn resolve_reference(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let lowered = reference.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let resolved = base.join(reference).ok()?;
    check_crawlable(resolved).ok()
}

fn check_crawlable(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/guide/intro.html").unwrap()
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_trailing_slash_preserved() {
        let result = normalize_url("https://example.com/std/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/std/");
    }

    #[test]
    fn test_lowercase_host() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_http_allowed() {
        let result = normalize_url("http://127.0.0.1:8080/").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_malformed_url() {
        let result = normalize_url("not a url");
        assert!(matches!(result, Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_resolve_relative_sibling() {
        let resolved = resolve_reference(&base(), "setup.html").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/guide/setup.html");
    }

    #[test]
    fn test_resolve_parent_and_root() {
        let parent = resolve_reference(&base(), "../api/index.html").unwrap();
        assert_eq!(parent.as_str(), "https://example.com/api/index.html");

        let root = resolve_reference(&base(), "/search").unwrap();
        assert_eq!(root.as_str(), "https://example.com/search");
    }

    #[test]
    fn test_resolve_scheme_relative() {
        let resolved = resolve_reference(&base(), "//cdn.example.net/app.js").unwrap();
        assert_eq!(resolved.as_str(), "https://cdn.example.net/app.js");
    }

    #[test]
    fn test_resolve_strips_fragment() {
        let resolved = resolve_reference(&base(), "setup.html#step-2").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/guide/setup.html");
    }

    #[test]
    fn test_skipped_references() {
        assert!(resolve_reference(&base(), "").is_none());
        assert!(resolve_reference(&base(), "#top").is_none());
        assert!(resolve_reference(&base(), "javascript:void(0)").is_none());
        assert!(resolve_reference(&base(), "JavaScript:alert(1)").is_none());
        assert!(resolve_reference(&base(), "mailto:docs@example.com").is_none());
        assert!(resolve_reference(&base(), "tel:+123").is_none());
        assert!(resolve_reference(&base(), "data:image/png;base64,AAAA").is_none());
        assert!(resolve_reference(&base(), "ftp://example.com/file").is_none());
    }

    #[test]
    fn test_malformed_reference_dropped() {
        assert!(resolve_reference(&base(), "http://[::1").is_none());
    }
}
