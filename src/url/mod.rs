//! URL handling module for Shiori
//!
//! This module provides URL parsing and reference resolution, host extraction
//! for same-site filtering, and the mapping from page URLs to local file paths.

mod host;
mod local_path;
mod normalize;

// Re-export main functions
pub use host::{extract_host, is_same_host};
pub use local_path::relative_path;
pub use normalize::{normalize_url, resolve_reference};
