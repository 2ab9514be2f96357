//! Crawl statistics and reports
//!
//! This module handles:
//! - Counting task outcomes while a crawl runs
//! - Freezing the counters into a per-crawl report
//! - Printing reports for the command line

pub mod stats;

pub use stats::{print_report, CrawlReport, CrawlStats};

/// Prints the totals of several crawls run from one configuration
pub fn print_totals(reports: &[CrawlReport]) {
    if reports.len() < 2 {
        return;
    }

    let tasks: u64 = reports.iter().map(CrawlReport::total_tasks).sum();
    let indexed: u64 = reports.iter().map(|r| r.pages_indexed).sum();
    let failures: u64 = reports.iter().map(CrawlReport::total_failures).sum();

    println!("=== Totals ({} doc sets) ===\n", reports.len());
    println!("  Tasks: {}", tasks);
    println!("  Pages indexed: {}", indexed);
    println!("  Failures: {}", failures);
}
