use url::Url;

/// Returns the authority used to decide whether two URLs are on the same site
///
/// The host is lowercased and an explicit non-default port is kept, so
/// `http://127.0.0.1:8080/` and `http://127.0.0.1:9090/` are different sites
/// while `https://example.com:443/` and `https://example.com/` are the same.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use shiori::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_host(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true if `url` lives on the crawl's seed host
pub fn is_same_host(url: &Url, seed_host: &str) -> bool {
    extract_host(url).is_some_and(|host| host == seed_host)
}
