//! State module for tracking crawl progress
//!
//! - `TaskState`: the lifecycle of a single crawl task, from the frontier to
//!   its outcome, with validated transitions

mod task_state;

pub use task_state::TaskState;
