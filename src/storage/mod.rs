//! Storage module for persisting fetched pages
//!
//! Pages are kept as plain files so the download directory doubles as an
//! offline copy of the documentation; the searchable text lives in the
//! [`index`](crate::index) instead.

mod pages;

pub use pages::PageStore;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving pages
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
