//! Integration tests for Shiori
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! crawl cycle end-to-end against an on-disk index.

mod crawl_tests;
mod index_tests;
