//! Shared test helpers for `quizgate-core` integration tests.
//!
//! In-memory fakes for the history and generator ports, plus a pipeline
//! fixture wired the same way the application context wires it.

#![allow(dead_code)]

pub mod generator;
pub mod history;

use std::sync::Arc;
use std::time::Duration;

use quizgate_common::cache::{CacheConfig, ItemBank, ResultCache};
use quizgate_common::queue::{JobQueue, QueueConfig};
use quizgate_common::resilience::{CircuitBreaker, CircuitBreakerConfig};
use quizgate_core::{AdaptiveEstimator, AdmissionPipeline, MinQualityGate};
use quizgate_domain::EstimatorSettings;

pub use self::generator::ScriptedGenerator;
pub use self::history::InMemoryHistory;

/// Queue settings that keep tests fast: no pacing, quick backoff
pub fn fast_queue_config() -> QueueConfig {
    QueueConfig {
        inter_request_delay: Duration::ZERO,
        retry_base_delay: Duration::from_millis(10),
        ..Default::default()
    }
}

/// Build a pipeline over fresh components
///
/// Must be called inside a Tokio runtime.
pub fn pipeline(
    history: InMemoryHistory,
    generator: ScriptedGenerator,
    queue_config: QueueConfig,
) -> AdmissionPipeline {
    let estimator =
        Arc::new(AdaptiveEstimator::new(Arc::new(history), EstimatorSettings::default()));
    let breaker =
        Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()).expect("valid breaker"));
    let queue = Arc::new(JobQueue::new(queue_config, breaker).expect("valid queue"));
    let cache = Arc::new(ResultCache::new(CacheConfig::default()));
    let bank = Arc::new(ItemBank::new(500));

    AdmissionPipeline::new(
        estimator,
        Arc::new(generator),
        Arc::new(MinQualityGate::new(0.7)),
        cache,
        bank,
        queue,
    )
}
