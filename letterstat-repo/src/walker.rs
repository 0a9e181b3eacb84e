//! Directory tree walker
//!
//! Discovers the content references of every eligible file under a root directory. Each subtree
//! produces its own list of references and the parent concatenates them. The only state shared
//! across the walk is the semaphore bounding in-flight listings. Any listing failure aborts the
//! whole discovery.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use letterstat_core::{
    log_operation_start, log_operation_success, DirectoryLister, EntryKind, ErrorContext,
    LetterStatError, LetterStatResult,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::filter;

/// Default number of directory listings in flight across the whole walk
pub const DEFAULT_LISTING_CONCURRENCY: usize = 4;
/// Default deepest directory level (root = 0)
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Walks a repository tree through a [`DirectoryLister`]
pub struct TreeWalker {
    lister: Arc<dyn DirectoryLister>,
    max_depth: usize,
    listing_concurrency: usize,
}

impl TreeWalker {
    pub fn new(lister: Arc<dyn DirectoryLister>) -> Self {
        Self {
            lister,
            max_depth: DEFAULT_MAX_DEPTH,
            listing_concurrency: DEFAULT_LISTING_CONCURRENCY,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_listing_concurrency(mut self, listing_concurrency: usize) -> Self {
        self.listing_concurrency = listing_concurrency.max(1);
        self
    }

    /// Collect the deduplicated content references of eligible files under `root`.
    ///
    /// With `recursive = false` only the root's immediate children are inspected.
    pub async fn discover(&self, root: &str, recursive: bool) -> LetterStatResult<Vec<String>> {
        log_operation_start!("discover", root = %root, recursive = recursive);

        let permits = Semaphore::new(self.listing_concurrency);
        let found = self.discover_at(root, recursive, 0, &permits).await?;

        let mut seen = HashSet::with_capacity(found.len());
        let refs: Vec<String> = found
            .into_iter()
            .filter(|content_ref| seen.insert(content_ref.clone()))
            .collect();

        info!("Found {} js/ts files.", refs.len());
        log_operation_success!("discover", root = %root, files = refs.len());
        Ok(refs)
    }

    fn discover_at<'a>(
        &'a self,
        path: &'a str,
        recursive: bool,
        depth: usize,
        permits: &'a Semaphore,
    ) -> BoxFuture<'a, LetterStatResult<Vec<String>>> {
        async move {
            if depth > self.max_depth {
                return Err(LetterStatError::Validation {
                    message: format!(
                        "Directory '{}' is deeper than the maximum depth of {}",
                        path, self.max_depth
                    ),
                    field: Some("max_depth".to_string()),
                    context: ErrorContext::new("tree_walker")
                        .with_operation("discover")
                        .with_metadata("path", path)
                        .with_suggestion("Raise analysis.max_depth"),
                });
            }

            let entries = {
                let _permit = permits.acquire().await.map_err(|e| LetterStatError::Internal {
                    message: format!("Listing semaphore closed: {}", e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("tree_walker").with_operation("discover"),
                })?;
                self.lister.list_directory(path).await?
            };

            let mut refs = Vec::new();
            let mut subdirectories = Vec::new();

            for entry in entries {
                match entry.kind {
                    EntryKind::File => match filter::eligible_ref(&entry) {
                        Some(content_ref) => refs.push(content_ref.to_string()),
                        None => debug!(path = %entry.path, "Skipping file"),
                    },
                    EntryKind::Directory if !recursive => {
                        debug!(path = %entry.path, "Skipping directory (non-recursive)");
                    }
                    EntryKind::Directory if entry.path.is_empty() => {
                        warn!(name = %entry.name, "Skipping directory without a path");
                    }
                    EntryKind::Directory => subdirectories.push(entry.path),
                }
            }

            let pending: Vec<_> = subdirectories
                .iter()
                .map(|subdirectory| self.discover_at(subdirectory, recursive, depth + 1, permits))
                .collect();

            let nested: Vec<Vec<String>> = stream::iter(pending)
                .buffered(self.listing_concurrency)
                .try_collect()
                .await?;

            refs.extend(nested.into_iter().flatten());
            Ok(refs)
        }
        .boxed()
    }
}
