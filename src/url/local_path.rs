use crate::url::extract_host;
use std::path::Path;
use url::Url;

/// Derives the path a page is saved under, relative to `root/name/version`
///
/// The host and path of the URL are joined, the seed host prefix and the
/// leading slash are removed and colons are replaced so the result is a valid
/// file name on every platform. Directory-like URLs get `index.html` and
/// extension-less URLs get `.html`. Query strings are not part of the path,
/// so `/a?x=1` and `/a?x=2` share a file.
pub fn relative_path(url: &Url, seed_host: &str) -> String {
    let host = extract_host(url).unwrap_or_default();
    let full = format!("{}{}", host, url.path());

    let relative = full.strip_prefix(seed_host).unwrap_or(&full);
    let mut relative = relative.trim_start_matches('/').replace(':', "_");

    if relative.is_empty() || relative.ends_with('/') {
        relative.push_str("index.html");
    } else if Path::new(&relative).extension().is_none() {
        relative.push_str(".html");
    }

    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(url: &str, seed_host: &str) -> String {
        relative_path(&Url::parse(url).unwrap(), seed_host)
    }

    #[test]
    fn test_root_becomes_index() {
        assert_eq!(rel("http://example.test/", "example.test"), "index.html");
    }

    #[test]
    fn test_directory_gets_index() {
        assert_eq!(
            rel("http://example.test/guide/", "example.test"),
            "guide/index.html"
        );
    }

    #[test]
    fn test_missing_extension_gets_html() {
        assert_eq!(rel("http://example.test/a", "example.test"), "a.html");
        assert_eq!(
            rel("http://example.test/std/vec/struct.Vec", "example.test"),
            "std/vec/struct.Vec"
        );
        assert_eq!(
            rel("http://example.test/reference/elements/a", "example.test"),
            "reference/elements/a.html"
        );
    }

    #[test]
    fn test_existing_extension_kept() {
        assert_eq!(
            rel("http://example.test/static/main.css", "example.test"),
            "static/main.css"
        );
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        assert_eq!(
            rel("http://example.test/search?q=vec#top", "example.test"),
            "search.html"
        );
    }

    #[test]
    fn test_seed_host_with_port_stripped() {
        assert_eq!(
            rel("http://127.0.0.1:8080/docs/", "127.0.0.1:8080"),
            "docs/index.html"
        );
    }

    #[test]
    fn test_foreign_host_colon_replaced() {
        assert_eq!(
            rel("http://127.0.0.1:9090/page", "127.0.0.1:8080"),
            "127.0.0.1_9090/page.html"
        );
    }

    #[test]
    fn test_dot_segments_cannot_escape() {
        assert_eq!(
            rel("http://example.test/a/../../etc/passwd", "example.test"),
            "etc/passwd.html"
        );
    }
}
