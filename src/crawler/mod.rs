//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with an optional retry policy
//! - Text and link extraction from HTML
//! - The frontier and visited set shared by the worker pool
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod visited;

pub use coordinator::{crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, is_html, FetchResult, RetryPolicy};
pub use frontier::{CrawlTask, DoneGuard, Frontier};
pub use parser::{decode_body, extract_page, ExtractedPage};
pub use visited::VisitedSet;
