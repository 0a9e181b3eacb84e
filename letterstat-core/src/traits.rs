//! Core trait definitions
//!
//! The crawl only ever talks to a repository through these seams, so the hosting client can be
//! swapped for an in-memory fake in tests.

use crate::error::LetterStatResult;
use crate::types::RepositoryEntry;
use async_trait::async_trait;

/// Lists the immediate children of a directory
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// List `path` ("" for the repository root).
    ///
    /// Fails with `Transport` on network/auth problems and `NotFound` when the path is unknown.
    async fn list_directory(&self, path: &str) -> LetterStatResult<Vec<RepositoryEntry>>;
}

/// Retrieves the raw text behind a content reference
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_content(&self, content_ref: &str) -> LetterStatResult<String>;
}

/// Fire-and-forget progress notifications
pub trait ProgressSink: Send + Sync {
    fn notify(&self, message: &str);
}

/// Progress sink that drops every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn notify(&self, _message: &str) {}
}
