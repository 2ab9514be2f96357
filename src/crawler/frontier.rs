//! Crawl frontier
//!
//! The frontier is the shared work queue of a crawl. Every enqueued task adds
//! one unit of outstanding work and every finished task removes one; when the
//! count drops to zero no worker can produce more tasks, so the frontier
//! closes and every waiting worker is released.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::Notify;

/// A URL waiting to be crawled, together with its link distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Work queue with an outstanding-work counter
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<CrawlTask>>,
    outstanding: AtomicUsize,
    closed: AtomicBool,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task and counts it as outstanding work
    ///
    /// Returns false, leaving the counter untouched, if the frontier has
    /// already closed.
    pub fn enqueue(&self, task: CrawlTask) -> bool {
        if self.is_closed() {
            tracing::warn!("Dropping {} enqueued after the frontier closed", task.url);
            return false;
        }

        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
        self.notify.notify_one();
        true
    }

    /// Waits for the next task
    ///
    /// Returns `None` once the frontier has closed and the queue is drained.
    pub async fn dequeue(&self) -> Option<CrawlTask> {
        loop {
            // Register interest before checking so a close or enqueue that
            // lands between the check and the await is not missed
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(task) = self.try_dequeue() {
                return Some(task);
            }

            if self.is_closed() {
                return None;
            }

            notified.await;
        }
    }

    fn try_dequeue(&self) -> Option<CrawlTask> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Marks one unit of outstanding work finished
    ///
    /// At zero the frontier closes and all waiting `dequeue` calls return
    /// `None`. A call with nothing outstanding is logged and ignored.
    pub fn done(&self) {
        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        match previous {
            Ok(1) => {
                self.closed.store(true, Ordering::SeqCst);
                self.notify.notify_waiters();
                tracing::debug!("Outstanding work reached zero, frontier closed");
            }
            Ok(_) => {}
            Err(_) => {
                tracing::error!("Frontier done() called with no outstanding work");
            }
        }
    }

    /// Returns a guard that calls [`Frontier::done`] when dropped
    ///
    /// Workers take one per dequeued task so the counter is released even if
    /// processing unwinds.
    pub fn done_guard(&self) -> DoneGuard<'_> {
        DoneGuard { frontier: self }
    }

    /// Number of tasks enqueued but not yet done
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Number of tasks waiting to be dequeued
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Calls `done` on its frontier exactly once, when dropped
#[must_use = "dropping the guard immediately marks the task done"]
pub struct DoneGuard<'a> {
    frontier: &'a Frontier,
}

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.frontier.done();
    }
}
