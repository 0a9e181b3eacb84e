//! Aggregation pipeline
//!
//! Fetches every discovered file with a bounded number of requests in flight and folds each file's
//! letter counts into one shared histogram. The first failed fetch aborts the run and drops the
//! fetches still in flight.

use futures::stream::{self, TryStreamExt};
use letterstat_core::{ContentFetcher, LetterStatError, LetterStatResult, ProgressSink};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::histogram::LetterHistogram;

/// Default number of concurrent content fetches
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Result of a completed aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub histogram: LetterHistogram,
    pub files_processed: usize,
}

pub struct AggregationPipeline {
    fetcher: Arc<dyn ContentFetcher>,
    progress: Arc<dyn ProgressSink>,
    max_concurrent: usize,
}

impl AggregationPipeline {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, progress: Arc<dyn ProgressSink>) -> Self {
        Self {
            fetcher,
            progress,
            max_concurrent: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Fetch and count every reference; fails as a whole if any fetch fails
    pub async fn aggregate(&self, refs: &[String]) -> LetterStatResult<Aggregation> {
        let global = Mutex::new(Aggregation::default());

        stream::iter(refs.iter().map(Ok::<_, LetterStatError>))
            .try_for_each_concurrent(self.max_concurrent, |content_ref| {
                let global = &global;
                async move {
                    self.progress.notify(content_ref);

                    let content = self.fetcher.fetch_content(content_ref).await?;
                    let partial = LetterHistogram::count(&content);
                    debug!(
                        content_ref = %content_ref,
                        letters = partial.total(),
                        "Counted file"
                    );

                    let mut aggregation = global.lock().await;
                    aggregation.histogram.merge_from(&partial);
                    aggregation.files_processed += 1;
                    Ok(())
                }
            })
            .await?;

        Ok(global.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use letterstat_core::{not_found_error, transport_error, NoopProgress};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves content from memory, optionally with a delay per reference
    #[derive(Default)]
    struct FakeFetcher {
        content: HashMap<String, String>,
        delays_ms: HashMap<String, u64>,
        failing: Vec<String>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl FakeFetcher {
        fn with_file(mut self, content_ref: &str, text: &str) -> Self {
            self.content.insert(content_ref.to_string(), text.to_string());
            self
        }

        fn with_delay(mut self, content_ref: &str, delay_ms: u64) -> Self {
            self.delays_ms.insert(content_ref.to_string(), delay_ms);
            self
        }

        fn failing_at(mut self, content_ref: &str) -> Self {
            self.failing.push(content_ref.to_string());
            self
        }
    }

    #[async_trait]
    impl ContentFetcher for FakeFetcher {
        async fn fetch_content(&self, content_ref: &str) -> LetterStatResult<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delays_ms.get(content_ref) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.iter().any(|r| r == content_ref) {
                return Err(transport_error!("connection reset", "fake_fetcher"));
            }
            self.content
                .get(content_ref)
                .cloned()
                .ok_or_else(|| not_found_error!(content_ref, "fake_fetcher"))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        messages: std::sync::Mutex<Vec<String>>,
    }

    impl ProgressSink for RecordingProgress {
        fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    fn refs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_aggregates_all_files() {
        let fetcher = FakeFetcher::default()
            .with_file("a.js", "const a = 1;")
            .with_file("b.js", "let b = 2;");
        let pipeline = AggregationPipeline::new(Arc::new(fetcher), Arc::new(NoopProgress));

        let result = pipeline.aggregate(&refs(&["a.js", "b.js"])).await.unwrap();

        assert_eq!(result.files_processed, 2);
        assert_eq!(result.histogram.get('t'), 2);
        assert_eq!(result.histogram.get('c'), 1);
        assert_eq!(result.histogram.get('l'), 1);
        assert_eq!(result.histogram.total(), 10);
    }

    #[tokio::test]
    async fn test_empty_reference_set_is_empty_histogram() {
        let pipeline =
            AggregationPipeline::new(Arc::new(FakeFetcher::default()), Arc::new(NoopProgress));

        let result = pipeline.aggregate(&[]).await.unwrap();
        assert_eq!(result, Aggregation::default());
    }

    #[tokio::test]
    async fn test_failure_on_second_file_fails_the_batch() {
        let fetcher = FakeFetcher::default()
            .with_file("1.js", "alpha")
            .with_file("3.js", "gamma")
            .failing_at("2.js");
        let pipeline = AggregationPipeline::new(Arc::new(fetcher), Arc::new(NoopProgress))
            .with_max_concurrent(1);

        let result = pipeline.aggregate(&refs(&["1.js", "2.js", "3.js"])).await;
        assert!(matches!(result, Err(LetterStatError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_missing_content_is_not_found() {
        let pipeline =
            AggregationPipeline::new(Arc::new(FakeFetcher::default()), Arc::new(NoopProgress));

        let result = pipeline.aggregate(&refs(&["gone.ts"])).await;
        assert!(matches!(result, Err(LetterStatError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_progress_is_reported_per_file() {
        let fetcher = FakeFetcher::default()
            .with_file("x.ts", "x")
            .with_file("y.ts", "y");
        let progress = Arc::new(RecordingProgress::default());
        let pipeline = AggregationPipeline::new(Arc::new(fetcher), progress.clone());

        pipeline.aggregate(&refs(&["x.ts", "y.ts"])).await.unwrap();

        let mut messages = progress.messages.lock().unwrap().clone();
        messages.sort();
        assert_eq!(messages, refs(&["x.ts", "y.ts"]));
    }

    #[tokio::test]
    async fn test_completion_order_does_not_change_result() {
        let slow_first = FakeFetcher::default()
            .with_file("a.js", "aaa bbb")
            .with_file("b.js", "BBB ccc")
            .with_file("c.js", "zzz")
            .with_delay("a.js", 30);
        let slow_last = FakeFetcher::default()
            .with_file("a.js", "aaa bbb")
            .with_file("b.js", "BBB ccc")
            .with_file("c.js", "zzz")
            .with_delay("c.js", 30);

        let all = refs(&["a.js", "b.js", "c.js"]);
        let first = AggregationPipeline::new(Arc::new(slow_first), Arc::new(NoopProgress))
            .aggregate(&all)
            .await
            .unwrap();
        let last = AggregationPipeline::new(Arc::new(slow_last), Arc::new(NoopProgress))
            .aggregate(&all)
            .await
            .unwrap();

        assert_eq!(first, last);
        assert_eq!(first.histogram.get('b'), 6);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let mut fetcher = FakeFetcher::default();
        let mut all = Vec::new();
        for i in 0..12 {
            let name = format!("{}.js", i);
            fetcher = fetcher.with_file(&name, "abc").with_delay(&name, 10);
            all.push(name);
        }
        let fetcher = Arc::new(fetcher);
        let pipeline =
            AggregationPipeline::new(fetcher.clone(), Arc::new(NoopProgress)).with_max_concurrent(3);

        let result = pipeline.aggregate(&all).await.unwrap();

        assert_eq!(result.files_processed, 12);
        assert_eq!(result.histogram.get('a'), 12);
        let peak = fetcher.peak_in_flight.load(Ordering::SeqCst);
        assert!((1..=3).contains(&peak), "peak in flight was {}", peak);
    }
}
