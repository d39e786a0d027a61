//! Application context - dependency injection container
//!
//! Builds the breaker, queue, cache, bank, estimator and pipeline once from
//! a loaded [`Config`] and shares them by `Arc`. The history store and the
//! generator are supplied by the embedding application.

use std::sync::Arc;

use quizgate_common::cache::{ItemBank, ResultCache};
use quizgate_common::queue::JobQueue;
use quizgate_common::resilience::CircuitBreaker;
use quizgate_core::generation::{BankedItem, GenerationQueue, ItemCache};
use quizgate_core::{
    AdaptiveEstimator, AdmissionPipeline, HealthReport, HistoryRepository, ItemGenerator,
    MinQualityGate,
};
use quizgate_domain::{Config, Result};
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::{breaker_config, cache_config, queue_config};
use crate::errors::InfraError;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub pipeline: Arc<AdmissionPipeline>,
    pub estimator: Arc<AdaptiveEstimator>,
    pub breaker: Arc<CircuitBreaker>,
    pub queue: Arc<GenerationQueue>,
    pub cache: Arc<ItemCache>,
    pub bank: Arc<ItemBank<BankedItem>>,

    // Background expiry sweep for the result cache
    sweeper: JoinHandle<()>,
}

impl AppContext {
    /// Validate `config` and wire every component
    ///
    /// Must be called inside a Tokio runtime; the queue's admission task and
    /// the cache sweeper are spawned on it.
    ///
    /// # Errors
    /// Returns `QuizgateError::Config` if the configuration is invalid, or
    /// `QuizgateError::Internal` if no runtime is available.
    pub fn new(
        config: Config,
        history: Arc<dyn HistoryRepository>,
        generator: Arc<dyn ItemGenerator>,
    ) -> Result<Self> {
        config.validate()?;

        let breaker = Arc::new(
            CircuitBreaker::new(breaker_config(&config.breaker)).map_err(InfraError::from)?,
        );
        let queue = Arc::new(
            JobQueue::new(queue_config(&config.queue), Arc::clone(&breaker))
                .map_err(InfraError::from)?,
        );

        let item_cache_config = cache_config(&config.cache);
        item_cache_config.validate().map_err(InfraError::from)?;
        let sweep_interval = item_cache_config.sweep_interval;
        let bank = Arc::new(ItemBank::new(item_cache_config.bank_capacity));
        let cache = Arc::new(ResultCache::new(item_cache_config));
        let sweeper = cache.spawn_sweeper(sweep_interval);

        let estimator = Arc::new(AdaptiveEstimator::new(history, config.estimator.clone()));
        let pipeline = Arc::new(AdmissionPipeline::new(
            Arc::clone(&estimator),
            generator,
            Arc::new(MinQualityGate::new(config.cache.bank_min_quality)),
            Arc::clone(&cache),
            Arc::clone(&bank),
            Arc::clone(&queue),
        ));

        info!(
            max_concurrent = config.queue.max_concurrent,
            cache_entries = config.cache.max_entries,
            bank_capacity = config.cache.bank_capacity,
            "application context ready"
        );

        Ok(Self { config, pipeline, estimator, breaker, queue, cache, bank, sweeper })
    }

    /// Combined queue, breaker and cache snapshot
    pub fn health(&self) -> HealthReport {
        self.pipeline.status()
    }

    /// Stop accepting work and reject everything still waiting
    ///
    /// Jobs already running finish normally.
    pub fn shutdown(&self) {
        self.queue.shutdown();
        self.sweeper.abort();
        info!("application context shut down");
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}
