use serde::Deserialize;

/// Main configuration structure for Shiori
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub docs: Vec<DocSeed>,
}

impl Config {
    /// Looks up a documentation seed by name
    pub fn doc(&self, name: &str) -> Option<&DocSeed> {
        self.docs.iter().find(|doc| doc.name == name)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link depth to follow from the seed URL (seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of worker tasks fetching pages concurrently
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Extra attempts for network errors and 5xx responses; 0 disables retries
    #[serde(rename = "max-retries", default)]
    pub max_retries: u32,

    /// Base delay before the first retry, doubled on every further attempt (milliseconds)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_retry_backoff_ms() -> u64 {
    500
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory under which pages are saved as `name/version/...`
    #[serde(rename = "download-path")]
    pub download_path: String,

    /// Directory holding the full-text index
    #[serde(rename = "index-path")]
    pub index_path: String,
}

/// Full-text index tuning
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Maximum edit distance accepted by fuzzy queries
    #[serde(rename = "fuzzy-distance", default = "default_fuzzy_distance")]
    pub fuzzy_distance: u8,

    /// Memory budget of the index writer (megabytes)
    #[serde(rename = "writer-heap-mb", default = "default_writer_heap_mb")]
    pub writer_heap_mb: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            fuzzy_distance: default_fuzzy_distance(),
            writer_heap_mb: default_writer_heap_mb(),
        }
    }
}

fn default_fuzzy_distance() -> u8 {
    1
}

fn default_writer_heap_mb() -> usize {
    50
}

/// A documentation set to crawl
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocSeed {
    /// Short name of the documentation set (e.g., "rust-std")
    pub name: String,

    /// Version label, used as a directory name
    pub version: String,

    /// URL the crawl starts from
    pub url: String,
}
