/// Task state definitions for tracking crawl progress
///
/// Every crawl task moves `Queued -> Claimed -> <outcome> -> Done`, except
/// duplicates, which go straight from `Queued` to `SkippedDuplicate`.
use crate::ShioriError;
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is waiting in the frontier
    Queued,

    /// Task won the claim on its URL and is being processed
    Claimed,

    // ===== Outcome States =====
    /// Page was fetched, saved, indexed and scanned for links
    Fetched,

    /// Another task already claimed the URL
    SkippedDuplicate,

    /// Task depth is beyond the configured maximum
    SkippedDepthExceeded,

    /// Connection, timeout or body read failure
    FailedNetwork,

    /// Server answered with a non-success status code
    FailedStatus,

    /// Body could not be decoded as an HTML document
    FailedParse,

    /// Resource was saved but is not HTML, so it is neither indexed nor scanned
    ContentMismatch,

    // ===== Terminal State =====
    /// Task finished and released its slot in the outstanding-work counter
    Done,
}

impl TaskState {
    /// Returns true if the task may still change state before `Done`
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Claimed)
    }

    /// Returns true for the states a task reports before becoming `Done`
    pub fn is_outcome(&self) -> bool {
        !self.is_active() && *self != Self::Done
    }

    /// Returns true if this represents a skip (no fetch was attempted)
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedDuplicate | Self::SkippedDepthExceeded)
    }

    /// Returns true if this represents a failed fetch or parse
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::FailedNetwork | Self::FailedStatus | Self::FailedParse
        )
    }

    /// Returns true if the state change is allowed by the task lifecycle
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        match (self, next) {
            (Self::Queued, Self::Claimed) => true,
            (Self::Queued, Self::SkippedDuplicate) => true,
            (Self::Claimed, next) => next.is_outcome() && next != Self::SkippedDuplicate,
            (current, Self::Done) => current.is_outcome(),
            _ => false,
        }
    }

    /// Moves to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(self, next: TaskState) -> Result<TaskState, ShioriError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ShioriError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short snake_case label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Claimed => "claimed",
            Self::Fetched => "fetched",
            Self::SkippedDuplicate => "skipped_duplicate",
            Self::SkippedDepthExceeded => "skipped_depth_exceeded",
            Self::FailedNetwork => "failed_network",
            Self::FailedStatus => "failed_status",
            Self::FailedParse => "failed_parse",
            Self::ContentMismatch => "content_mismatch",
            Self::Done => "done",
        }
    }

    /// Returns every state a task can report as its outcome
    pub fn outcomes() -> [Self; 7] {
        [
            Self::Fetched,
            Self::SkippedDuplicate,
            Self::SkippedDepthExceeded,
            Self::FailedNetwork,
            Self::FailedStatus,
            Self::FailedParse,
            Self::ContentMismatch,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
