//! Statistics collected while a crawl runs
//!
//! Workers record outcomes into a shared [`CrawlStats`]; when the crawl ends
//! the counters are frozen into a [`CrawlReport`].

use crate::config::DocSeed;
use crate::state::TaskState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by all workers of one crawl
#[derive(Debug, Default)]
pub struct CrawlStats {
    fetched: AtomicU64,
    skipped_duplicate: AtomicU64,
    skipped_depth_exceeded: AtomicU64,
    failed_network: AtomicU64,
    failed_status: AtomicU64,
    failed_parse: AtomicU64,
    content_mismatch: AtomicU64,

    links_discovered: AtomicU64,
    links_offsite: AtomicU64,
    links_enqueued: AtomicU64,
    pages_indexed: AtomicU64,
    index_failures: AtomicU64,
    storage_failures: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn outcome_counter(&self, state: TaskState) -> Option<&AtomicU64> {
        match state {
            TaskState::Fetched => Some(&self.fetched),
            TaskState::SkippedDuplicate => Some(&self.skipped_duplicate),
            TaskState::SkippedDepthExceeded => Some(&self.skipped_depth_exceeded),
            TaskState::FailedNetwork => Some(&self.failed_network),
            TaskState::FailedStatus => Some(&self.failed_status),
            TaskState::FailedParse => Some(&self.failed_parse),
            TaskState::ContentMismatch => Some(&self.content_mismatch),
            TaskState::Queued | TaskState::Claimed | TaskState::Done => None,
        }
    }

    /// Counts a task that finished in `state`
    ///
    /// Non-outcome states are ignored.
    pub fn record_outcome(&self, state: TaskState) {
        if let Some(counter) = self.outcome_counter(state) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn count(&self, state: TaskState) -> u64 {
        self.outcome_counter(state)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn add_links_discovered(&self, n: u64) {
        self.links_discovered.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_offsite_link(&self) {
        self.links_offsite.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enqueued_link(&self) {
        self.links_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_indexed(&self) {
        self.pages_indexed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_index_failure(&self) {
        self.index_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_storage_failure(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a report for `seed`
    pub fn finish(&self, seed: &DocSeed, started_at: DateTime<Utc>) -> CrawlReport {
        let outcomes = TaskState::outcomes()
            .into_iter()
            .map(|state| (state, self.count(state)))
            .collect();

        CrawlReport {
            name: seed.name.clone(),
            version: seed.version.clone(),
            seed_url: seed.url.clone(),
            started_at,
            finished_at: Utc::now(),
            outcomes,
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            links_offsite: self.links_offsite.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            pages_indexed: self.pages_indexed.load(Ordering::Relaxed),
            index_failures: self.index_failures.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
        }
    }
}

/// Summary of one finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub name: String,
    pub version: String,
    pub seed_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Number of tasks that ended in each outcome state
    pub outcomes: HashMap<TaskState, u64>,

    /// Absolute references found on fetched pages, duplicates included
    pub links_discovered: u64,

    /// Discovered references pointing at another host
    pub links_offsite: u64,

    /// Discovered references turned into new tasks
    pub links_enqueued: u64,

    pub pages_indexed: u64,
    pub index_failures: u64,
    pub storage_failures: u64,
}

impl CrawlReport {
    /// Number of tasks that ended in `state`
    pub fn count(&self, state: TaskState) -> u64 {
        self.outcomes.get(&state).copied().unwrap_or(0)
    }

    /// Number of tasks the crawl finished, whatever their outcome
    pub fn total_tasks(&self) -> u64 {
        self.outcomes.values().sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(state, _)| state.is_failure())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!(
        "=== Crawl Report: {} {} ===\n",
        report.name, report.version
    );

    println!("Overview:");
    println!("  Seed: {}", report.seed_url);
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!(
        "  Duration: {:.1}s",
        report.duration().num_milliseconds() as f64 / 1000.0
    );
    println!("  Tasks: {}", report.total_tasks());
    println!();

    println!("Tasks by Outcome:");
    let mut outcome_counts: Vec<_> = report
        .outcomes
        .iter()
        .filter(|(_, count)| **count > 0)
        .collect();
    outcome_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

    for (state, count) in outcome_counts {
        let percentage = if report.total_tasks() > 0 {
            (*count as f64 / report.total_tasks() as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    println!("Links:");
    println!("  Discovered: {}", report.links_discovered);
    println!("  Offsite: {}", report.links_offsite);
    println!("  Enqueued: {}", report.links_enqueued);
    println!();

    println!("Index:");
    println!("  Pages indexed: {}", report.pages_indexed);
    if report.index_failures > 0 {
        println!("  Index failures: {}", report.index_failures);
    }
    if report.storage_failures > 0 {
        println!("  Storage failures: {}", report.storage_failures);
    }
}
