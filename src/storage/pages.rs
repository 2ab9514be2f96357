//! On-disk page store
//!
//! Fetched bodies are written byte-for-byte below
//! `download-path/<name>/<version>/`, mirroring the site layout so a crawl can
//! be browsed offline.

use crate::storage::{StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// Writes fetched pages under the directory of one documentation set
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    /// Creates a store rooted at `download_path/name/version`
    ///
    /// Nothing is created on disk until the first page is saved.
    pub fn new(download_path: &Path, name: &str, version: &str) -> Self {
        Self {
            root: download_path.join(name).join(version),
        }
    }

    /// Directory every saved page lives under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path a relative page path maps to
    pub fn path_for(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Saves `body` at `relative`, creating parent directories as needed
    ///
    /// An existing file at the same path is overwritten.
    pub async fn save(&self, relative: &str, body: &[u8]) -> StorageResult<PathBuf> {
        let path = self.path_for(relative);

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StorageError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&path, body)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}
