//! Full-text index over crawled pages
//!
//! Documents are keyed by the local path of the saved page and hold the
//! page's extracted text. The index answers query-language searches and
//! fuzzy single-term lookups, both returning document paths.

mod engine;
mod schema;

pub use engine::TantivyIndex;
pub use schema::{CONTENT_FIELD, PATH_FIELD};

use std::path::PathBuf;
use tantivy::query::QueryParserError;
use tantivy::TantivyError;
use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index is closed")]
    Closed,

    #[error("Index was opened read-only")]
    ReadOnly,

    #[error("No index found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to open index directory {}: {message}", path.display())]
    Directory { path: PathBuf, message: String },

    #[error("Invalid query: {0}")]
    QueryParse(#[from] QueryParserError),

    #[error("Search engine error: {0}")]
    Engine(#[from] TantivyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Trait for full-text index implementations
///
/// Implementations serialize writes internally, so a shared reference can be
/// used from any number of crawl workers at once.
pub trait DocumentIndex: Send + Sync {
    /// Adds the document at `path`, replacing any previous version
    fn insert(&self, path: &str, content: &str) -> IndexResult<()>;

    /// Runs a query-language search and returns matching paths, best first
    ///
    /// Bare terms search the page text; `path:` and `content:` select a field
    /// explicitly; quotes make a phrase; `AND`, `OR`, `-` and `+` combine.
    fn query(&self, query: &str) -> IndexResult<Vec<String>>;

    /// Returns paths containing a term within a small edit distance of `term`
    fn fuzzy_query(&self, term: &str) -> IndexResult<Vec<String>>;

    /// Number of searchable documents
    fn num_docs(&self) -> IndexResult<u64>;

    /// Flushes pending work and releases the index; later calls fail with
    /// [`IndexError::Closed`]
    fn close(&self) -> IndexResult<()>;
}
