//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of
//! crawling one documentation set, including:
//! - Seeding the frontier and running the worker pool
//! - Claiming URLs and enforcing the depth bound
//! - Coordinating fetching, saving, text extraction and indexing
//! - Enqueueing same-host links one level deeper
//! - Producing the crawl report

use crate::config::{Config, DocSeed};
use crate::crawler::fetcher::{build_http_client, fetch_url, is_html, FetchResult, RetryPolicy};
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::parser::{decode_body, extract_page, ExtractedPage};
use crate::crawler::visited::VisitedSet;
use crate::index::{DocumentIndex, TantivyIndex};
use crate::output::{CrawlReport, CrawlStats};
use crate::state::TaskState;
use crate::storage::PageStore;
use crate::url::{extract_host, is_same_host, normalize_url, relative_path};
use crate::{Result, ShioriError};
use chrono::Utc;
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

/// Main crawler coordinator structure
///
/// One coordinator can run any number of crawls in sequence; each crawl gets
/// a fresh frontier, visited set and statistics while the HTTP client and the
/// index are shared.
pub struct Coordinator {
    client: Client,
    retry: RetryPolicy,
    workers: usize,
    download_path: PathBuf,
    index: Arc<dyn DocumentIndex>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `index` - The index every fetched page is written into
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ShioriError)` - The HTTP client could not be built
    pub fn new(config: &Config, index: Arc<dyn DocumentIndex>) -> Result<Self> {
        let timeout = Duration::from_secs(config.crawler.fetch_timeout_secs);
        let client = build_http_client(&config.user_agent, timeout)?;

        Ok(Self {
            client,
            retry: RetryPolicy::from_config(&config.crawler),
            workers: config.crawler.max_concurrent_fetches.max(1) as usize,
            download_path: PathBuf::from(&config.output.download_path),
            index,
        })
    }

    /// Crawls one documentation set
    ///
    /// Starts from `seed.url` at depth 0 and follows same-host links while the
    /// link depth stays within `max_depth`. Returns once every enqueued task
    /// is done.
    ///
    /// # Errors
    ///
    /// Only an unusable seed URL aborts the crawl. Failures of individual
    /// pages are logged and counted in the report.
    pub async fn crawl(&self, seed: &DocSeed, max_depth: u32) -> Result<CrawlReport> {
        let seed_url = normalize_url(&seed.url).map_err(|e| ShioriError::InvalidSeedUrl {
            url: seed.url.clone(),
            reason: e.to_string(),
        })?;
        let seed_host = extract_host(&seed_url).ok_or_else(|| ShioriError::InvalidSeedUrl {
            url: seed.url.clone(),
            reason: "URL has no host".to_string(),
        })?;

        let started_at = Utc::now();
        tracing::info!(
            "Crawling {} {} from {} (max depth {}, {} workers)",
            seed.name,
            seed.version,
            seed_url,
            max_depth,
            self.workers
        );

        let ctx = Arc::new(self.context(seed, seed_host, max_depth));

        ctx.frontier.enqueue(CrawlTask::new(seed_url.as_str(), 0));

        let mut workers = JoinSet::new();
        for worker_id in 0..self.workers {
            let ctx = Arc::clone(&ctx);
            workers.spawn(run_worker(worker_id, ctx));
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker stopped abnormally: {}", e);
            }
        }

        if ctx.frontier.outstanding() > 0 {
            tracing::error!(
                "Crawl of {} ended with {} tasks outstanding",
                seed.name,
                ctx.frontier.outstanding()
            );
        }

        let report = ctx.stats.finish(seed, started_at);
        tracing::info!(
            "Crawl of {} {} completed: {} pages fetched, {} indexed, {} failed, {} URLs visited in {}ms",
            seed.name,
            seed.version,
            report.count(TaskState::Fetched),
            report.pages_indexed,
            report.total_failures(),
            ctx.visited.len(),
            report.duration().num_milliseconds()
        );

        Ok(report)
    }

    /// Fresh per-crawl state sharing this coordinator's client and index
    fn context(&self, seed: &DocSeed, seed_host: String, max_depth: u32) -> CrawlContext {
        CrawlContext {
            client: self.client.clone(),
            retry: self.retry,
            index: Arc::clone(&self.index),
            store: PageStore::new(&self.download_path, &seed.name, &seed.version),
            seed_host,
            max_depth,
            frontier: Frontier::new(),
            visited: VisitedSet::new(),
            stats: CrawlStats::new(),
        }
    }
}

/// State shared by the workers of one crawl
struct CrawlContext {
    client: Client,
    retry: RetryPolicy,
    index: Arc<dyn DocumentIndex>,
    store: PageStore,
    seed_host: String,
    max_depth: u32,
    frontier: Frontier,
    visited: VisitedSet,
    stats: CrawlStats,
}

/// Pulls tasks until the frontier closes
async fn run_worker(worker_id: usize, ctx: Arc<CrawlContext>) {
    tracing::trace!("Worker {} started", worker_id);

    while let Some(task) = ctx.frontier.dequeue().await {
        let _done = ctx.frontier.done_guard();

        let outcome = ctx.process_task(&task).await;
        ctx.stats.record_outcome(outcome);
        advance(&task, outcome, TaskState::Done);
    }

    tracing::trace!("Worker {} finished", worker_id);
}

/// Moves a task between states, logging the change
///
/// The coordinator only requests lifecycle transitions, so a rejected one is
/// a bug; it is logged and the requested state is used anyway.
fn advance(task: &CrawlTask, from: TaskState, to: TaskState) -> TaskState {
    match from.transition(to) {
        Ok(next) => {
            tracing::trace!("{} (depth {}): {} -> {}", task.url, task.depth, from, next);
            next
        }
        Err(e) => {
            tracing::error!("{} (depth {}): {}", task.url, task.depth, e);
            to
        }
    }
}

impl CrawlContext {
    /// Processes a single task and returns its outcome state
    ///
    /// This method:
    /// 1. Claims the URL (duplicates stop here)
    /// 2. Checks the depth bound
    /// 3. Fetches the page
    /// 4. Saves, extracts, indexes and follows links
    async fn process_task(&self, task: &CrawlTask) -> TaskState {
        let state = TaskState::Queued;

        if !self.visited.claim(&task.url) {
            tracing::debug!("Skipping {}: already claimed", task.url);
            return advance(task, state, TaskState::SkippedDuplicate);
        }
        let state = advance(task, state, TaskState::Claimed);

        // Links are filtered before enqueueing; this catches any other source
        if task.depth > self.max_depth {
            tracing::debug!(
                "Skipping {}: depth {} exceeds {}",
                task.url,
                task.depth,
                self.max_depth
            );
            return advance(task, state, TaskState::SkippedDepthExceeded);
        }

        let url = match Url::parse(&task.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Failed to parse task URL {}: {}", task.url, e);
                return advance(task, state, TaskState::FailedParse);
            }
        };

        let outcome = match fetch_url(&self.client, url.as_str(), &self.retry).await {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
            } => {
                tracing::debug!("Fetched {} (HTTP {}, {} bytes)", url, status_code, body.len());
                self.handle_page(task, &url, &final_url, content_type.as_deref(), &body)
                    .await
            }

            FetchResult::HttpError { status_code } => {
                tracing::warn!("HTTP {} for {}", status_code, url);
                TaskState::FailedStatus
            }

            FetchResult::NetworkError { error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
                TaskState::FailedNetwork
            }
        };

        advance(task, state, outcome)
    }

    /// Handles a successfully fetched body and returns the outcome state
    async fn handle_page(
        &self,
        task: &CrawlTask,
        url: &Url,
        final_url: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> TaskState {
        let relative = relative_path(url, &self.seed_host);
        let local_path = self.store.path_for(&relative);
        self.save_page(url, &relative, body).await;

        if !is_html(content_type) {
            tracing::debug!(
                "Not indexing {}: content type {}",
                url,
                content_type.unwrap_or("unknown")
            );
            return TaskState::ContentMismatch;
        }

        let html = match decode_body(body, url.as_str()) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("{}", e);
                return TaskState::FailedParse;
            }
        };

        // Relative references resolve against where the page actually lives
        let base = Url::parse(final_url).unwrap_or_else(|_| url.clone());
        let ExtractedPage { title, text, links } = extract_page(html, &base);

        self.index_page(url, &local_path, title.as_deref(), text).await;
        self.enqueue_links(task, &links);

        TaskState::Fetched
    }

    /// Writes the body to the page store; failures are logged and counted
    async fn save_page(&self, url: &Url, relative: &str, body: &[u8]) {
        match self.store.save(relative, body).await {
            Ok(path) => tracing::debug!("Saved {} to {}", url, path.display()),
            Err(e) => {
                tracing::warn!("Failed to save {}: {}", url, e);
                self.stats.record_storage_failure();
            }
        }
    }

    /// Inserts the page text under its local path; failures are logged and counted
    async fn index_page(&self, url: &Url, local_path: &Path, title: Option<&str>, text: String) {
        let doc_path = local_path.to_string_lossy().into_owned();
        let index = Arc::clone(&self.index);

        let inserted = {
            let doc_path = doc_path.clone();
            tokio::task::spawn_blocking(move || index.insert(&doc_path, &text)).await
        };

        match inserted {
            Ok(Ok(())) => {
                self.stats.record_indexed();
                tracing::info!(
                    "Indexed {} as {} ({})",
                    url,
                    doc_path,
                    title.unwrap_or("untitled")
                );
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to index {}: {}", url, e);
                self.stats.record_index_failure();
            }
            Err(e) => {
                tracing::error!("Index task for {} did not complete: {}", url, e);
                self.stats.record_index_failure();
            }
        }
    }

    /// Enqueues same-host links one level deeper than `task`
    fn enqueue_links(&self, task: &CrawlTask, links: &[String]) {
        self.stats.add_links_discovered(links.len() as u64);

        let next_depth = task.depth + 1;
        let mut seen = HashSet::new();

        for link in links {
            if !seen.insert(link.as_str()) {
                continue;
            }

            let Ok(link_url) = Url::parse(link) else {
                continue;
            };

            if !is_same_host(&link_url, &self.seed_host) {
                tracing::trace!("Not following offsite link {}", link);
                self.stats.record_offsite_link();
                continue;
            }

            if next_depth > self.max_depth || self.visited.contains(link) {
                continue;
            }

            if self.frontier.enqueue(CrawlTask::new(link.as_str(), next_depth)) {
                self.stats.record_enqueued_link();
            }
        }
    }
}

/// Crawls every documentation set of a configuration into one index
///
/// Opens (or creates) the index at `output.index-path`, crawls each
/// `[[docs]]` entry in order with `crawler.max-depth` and closes the index
/// once all crawls have finished.
///
/// # Example
///
/// ```no_run
/// use shiori::config::load_config;
/// use shiori::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let reports = crawl(config).await?;
/// println!("{} doc sets crawled", reports.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<Vec<CrawlReport>> {
    if config.docs.is_empty() {
        tracing::warn!("No [[docs]] entries configured, nothing to crawl");
        return Ok(Vec::new());
    }

    let index_path = PathBuf::from(&config.output.index_path);
    let index_config = config.index.clone();
    let index = tokio::task::spawn_blocking(move || {
        TantivyIndex::open_or_create(&index_path, &index_config)
    })
    .await??;
    let index = Arc::new(index);

    let coordinator = Coordinator::new(&config, Arc::clone(&index) as Arc<dyn DocumentIndex>)?;

    let mut reports = Vec::with_capacity(config.docs.len());
    let mut result = Ok(());
    for seed in &config.docs {
        match coordinator.crawl(seed, config.crawler.max_depth).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    drop(coordinator);
    let closed = tokio::task::spawn_blocking(move || index.close()).await?;

    result?;
    closed?;
    Ok(reports)
}
