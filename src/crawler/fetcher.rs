//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests returning the raw body bytes
//! - Optional retries with exponential backoff
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value, if the server sent one
        content_type: Option<String>,
        /// Raw page body
        body: Vec<u8>,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true if another attempt could succeed
    fn is_transient(&self) -> bool {
        match self {
            Self::Success { .. } => false,
            Self::HttpError { status_code } => {
                StatusCode::from_u16(*status_code).is_ok_and(|s| s.is_server_error())
            }
            Self::NetworkError { .. } => true,
        }
    }
}

/// How often and how patiently failed fetches are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first; 0 means a single attempt
    pub max_retries: u32,

    /// Delay before the first retry; doubled for every further retry
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A single attempt, never retried
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Builds the policy from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay before retry number `retry` (starting at 0)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to reqwest's default of 10 hops); the
/// request timeout bounds the whole exchange including the body so a hung
/// server cannot stall a worker forever.
///
/// # Example
///
/// ```no_run
/// use shiori::config::UserAgentConfig;
/// use shiori::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "Shiori".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/shiori".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, retrying transient failures according to `retry`
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 4xx and other non-success | Immediate → HttpError |
/// | HTTP 5xx | Retry while attempts remain → HttpError |
/// | Timeout, connection or body error | Retry while attempts remain → NetworkError |
///
/// With the default policy (`max_retries = 0`) every URL gets exactly one
/// attempt.
pub async fn fetch_url(client: &Client, url: &str, retry: &RetryPolicy) -> FetchResult {
    let mut attempt = 0;

    loop {
        let result = fetch_once(client, url).await;

        if !result.is_transient() || attempt >= retry.max_retries {
            return result;
        }

        let delay = retry.delay_for(attempt);
        tracing::debug!(
            "Retrying {} in {:?} (attempt {} of {}): {:?}",
            url,
            delay,
            attempt + 2,
            retry.max_retries + 1,
            result
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Performs a single GET request
async fn fetch_once(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };

    FetchResult::NetworkError { error }
}

/// Returns true if a Content-Type names an HTML document
///
/// A missing Content-Type is treated as HTML, matching how browsers sniff
/// documentation servers that omit it.
pub fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(value) => {
            let mime = value.split(';').next().unwrap_or("").trim();
            mime.eq_ignore_ascii_case("text/html")
                || mime.eq_ignore_ascii_case("application/xhtml+xml")
        }
    }
}
