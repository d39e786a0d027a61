//! Integration tests for the application context
//!
//! Wires the full stack from a `Config` with in-memory ports and drives a
//! request through it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use quizgate_common::queue::{ProgressReporter, QueueError};
use quizgate_core::{CoreError, HistoryRepository, ItemGenerator, Source};
use quizgate_domain::{
    Config, DifficultyTier, GeneratedItem, GenerationRequest, HistoricalOutcomeRecord,
    QuizgateError, Result as DomainResult,
};
use quizgate_infra::AppContext;

struct EmptyHistory;

#[async_trait]
impl HistoryRepository for EmptyHistory {
    async fn recent_outcomes(
        &self,
        _user_id: &str,
        _subject: &str,
        _grade: &str,
        _limit: usize,
    ) -> DomainResult<Vec<HistoricalOutcomeRecord>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct CountingGenerator {
    calls: AtomicU32,
}

#[async_trait]
impl ItemGenerator for CountingGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
        difficulty: DifficultyTier,
        _progress: &ProgressReporter,
    ) -> DomainResult<Vec<GeneratedItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..request.count)
            .map(|n| {
                GeneratedItem::new("general", format!("Q{n}"), format!("A{n}"), difficulty)
                    .with_quality(0.95)
            })
            .collect())
    }
}

fn fast_config() -> Config {
    let mut config = Config::default();
    config.queue.inter_request_delay_ms = 0;
    config
}

/// Validates the context wires a working pipeline.
///
/// Assertions:
/// - Ensures a first request is generated and a repeat is cached.
/// - Confirms the health report reflects both requests.
#[tokio::test]
async fn test_context_serves_requests() {
    let generator = Arc::new(CountingGenerator::default());
    let context = AppContext::new(fast_config(), Arc::new(EmptyHistory), generator.clone())
        .expect("context");

    let request = GenerationRequest::new("learner-1", "Science", "7", 3);
    let first = context.pipeline.generate(request.clone()).await.expect("first request");
    let second = context.pipeline.generate(request).await.expect("second request");

    assert_eq!(first.source, Source::Generated);
    assert_eq!(first.difficulty, DifficultyTier::Medium);
    assert_eq!(second.source, Source::Cache);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    let health = context.health();
    assert_eq!(health.queue.stats.total_processed, 1);
    assert_eq!(health.cache.exact.hits, 1);
    assert_eq!(health.cache.bank_items, 3);
    assert_eq!(health.queue.max_concurrent, context.config.queue.max_concurrent);
}

/// Validates invalid settings are rejected before anything is spawned.
#[tokio::test]
async fn test_context_rejects_invalid_config() {
    let mut config = fast_config();
    config.cache.ttl_ms = 0;

    let result = AppContext::new(config, Arc::new(EmptyHistory), Arc::new(CountingGenerator::default()));
    assert!(matches!(result, Err(QuizgateError::Config(_))));
}

/// Validates shutdown rejects new work.
#[tokio::test]
async fn test_shutdown_rejects_new_requests() {
    let context =
        AppContext::new(fast_config(), Arc::new(EmptyHistory), Arc::new(CountingGenerator::default()))
            .expect("context");

    context.shutdown();

    let error = context
        .pipeline
        .generate(GenerationRequest::new("learner-1", "Science", "7", 2))
        .await
        .expect_err("queue is shut down");
    assert!(
        matches!(error, CoreError::Queue(QueueError::ShuttingDown)),
        "unexpected error: {error:?}"
    );
}
