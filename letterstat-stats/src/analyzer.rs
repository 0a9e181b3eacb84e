//! Discovery + aggregation entry point
//!
//! Discovery runs to completion before the first content fetch is issued.

use letterstat_core::{
    log_operation_error, log_operation_start, log_operation_success, performance,
    AnalysisConfig, ContentFetcher, DirectoryLister, LetterStatConfig, LetterStatResult,
    ProgressSink,
};
use letterstat_repo::{ApiClientConfig, GitHubContentsClient, TreeWalker};
use std::sync::Arc;

use crate::histogram::LetterHistogram;
use crate::pipeline::AggregationPipeline;

/// Outcome of one analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub histogram: LetterHistogram,
    pub files_discovered: usize,
    pub files_processed: usize,
}

/// Walks a repository and counts letters across its script files
pub struct LetterStatistics {
    walker: TreeWalker,
    pipeline: AggregationPipeline,
}

impl LetterStatistics {
    pub fn new(
        lister: Arc<dyn DirectoryLister>,
        fetcher: Arc<dyn ContentFetcher>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            walker: TreeWalker::new(lister),
            pipeline: AggregationPipeline::new(fetcher, progress),
        }
    }

    /// Analysis backed by the GitHub contents API for the configured repository
    pub fn for_github(
        config: &LetterStatConfig,
        progress: Arc<dyn ProgressSink>,
    ) -> LetterStatResult<Self> {
        let client = Arc::new(GitHubContentsClient::new(
            ApiClientConfig::from(&config.api),
            config.repo_info(),
        )?);

        Ok(Self::new(client.clone(), client, progress).with_settings(&config.analysis))
    }

    /// Apply depth and concurrency limits
    pub fn with_settings(self, analysis: &AnalysisConfig) -> Self {
        Self {
            walker: self
                .walker
                .with_max_depth(analysis.max_depth)
                .with_listing_concurrency(analysis.max_concurrent_fetches),
            pipeline: self
                .pipeline
                .with_max_concurrent(analysis.max_concurrent_fetches),
        }
    }

    /// Discover eligible files under `root` and aggregate their letter counts
    pub async fn analyze(&self, root: &str, recursive: bool) -> LetterStatResult<AnalysisOutcome> {
        log_operation_start!("analyze", root = %root, recursive = recursive);

        let refs = performance::measure_async("discovery", self.walker.discover(root, recursive))
            .await
            .map_err(|e| {
                log_operation_error!("discovery", e, root = %root);
                e
            })?;

        let aggregation = performance::measure_async("aggregation", self.pipeline.aggregate(&refs))
            .await
            .map_err(|e| {
                log_operation_error!("aggregation", e, files = refs.len());
                e
            })?;

        log_operation_success!("analyze",
            files_discovered = refs.len(),
            files_processed = aggregation.files_processed,
            letters = aggregation.histogram.total()
        );

        Ok(AnalysisOutcome {
            histogram: aggregation.histogram,
            files_discovered: refs.len(),
            files_processed: aggregation.files_processed,
        })
    }

    pub async fn run_discovery_and_aggregation(
        &self,
        root: &str,
        recursive: bool,
    ) -> LetterStatResult<LetterHistogram> {
        Ok(self.analyze(root, recursive).await?.histogram)
    }
}
