//! Admission pipeline - core business logic
//!
//! A request is served from the cheapest source that can satisfy it:
//!
//! 1. Explicit difficulty on the request, or a recommendation from the
//!    [`AdaptiveEstimator`]
//! 2. The exact result cache, keyed by subject, grade, count, topics and
//!    difficulty
//! 3. The item bank for the subject and grade
//! 4. A job on the [`JobQueue`], which calls the generator under circuit
//!    breaker protection
//!
//! Freshly generated items are written back to the cache, and the ones the
//! [`QualityGate`] accepts are appended to the bank.

use std::sync::Arc;

use quizgate_common::cache::{BankBucket, BankEntry, CacheKey, CacheStatus, ItemBank, ResultCache};
use quizgate_common::queue::{JobContext, JobQueue, QueueStatus};
use quizgate_common::resilience::{BoxedError, BreakerStatus, Clock, SystemClock};
use quizgate_domain::{DifficultyTier, GeneratedItem, GenerationRequest};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::ports::{ItemGenerator, QualityGate};
use crate::errors::CoreResult;
use crate::estimator::{AdaptiveEstimator, Recommendation};

/// Where the items in an outcome came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Bank,
    Generated,
}

/// Items served for one request
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub items: Vec<GeneratedItem>,
    pub difficulty: DifficultyTier,
    /// Present when the estimator chose the difficulty
    pub recommendation: Option<Recommendation>,
    pub source: Source,
}

/// Combined snapshot for a health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub queue: QueueStatus,
    pub breaker: BreakerStatus,
    pub cache: CacheStatus,
}

/// Generated item held in the item bank
#[derive(Debug, Clone, PartialEq)]
pub struct BankedItem(pub GeneratedItem);

impl BankEntry for BankedItem {
    fn topic(&self) -> &str {
        &self.0.topic
    }
}

/// Exact-match cache of generated item sets
pub type ItemCache<C = SystemClock> = ResultCache<Vec<GeneratedItem>, C>;

/// Queue running generation jobs
pub type GenerationQueue<C = SystemClock> = JobQueue<Vec<GeneratedItem>, C>;

/// Orchestrates estimator, cache, bank and queue for generation requests
pub struct AdmissionPipeline<C: Clock = SystemClock> {
    estimator: Arc<AdaptiveEstimator>,
    generator: Arc<dyn ItemGenerator>,
    quality_gate: Arc<dyn QualityGate>,
    cache: Arc<ItemCache<C>>,
    bank: Arc<ItemBank<BankedItem>>,
    queue: Arc<GenerationQueue<C>>,
}

impl<C: Clock> AdmissionPipeline<C> {
    /// Create a new pipeline over shared components
    pub fn new(
        estimator: Arc<AdaptiveEstimator>,
        generator: Arc<dyn ItemGenerator>,
        quality_gate: Arc<dyn QualityGate>,
        cache: Arc<ItemCache<C>>,
        bank: Arc<ItemBank<BankedItem>>,
        queue: Arc<GenerationQueue<C>>,
    ) -> Self {
        Self { estimator, generator, quality_gate, cache, bank, queue }
    }

    /// Serve a generation request
    ///
    /// # Errors
    /// - `CoreError::Domain` for an invalid request or a history store failure
    /// - `CoreError::Queue` when the queue is full, the circuit is open, or
    ///   the generator kept failing
    #[instrument(
        skip(self, request),
        fields(user_id = %request.user_id, subject = %request.subject, grade = %request.grade)
    )]
    pub async fn generate(&self, request: GenerationRequest) -> CoreResult<GenerationOutcome> {
        request.validate()?;

        let (difficulty, recommendation) = match request.difficulty {
            Some(difficulty) => (difficulty, None),
            None => {
                let recommendation = self
                    .estimator
                    .recommend(&request.user_id, &request.subject, &request.grade, &request.topics)
                    .await?;
                (recommendation.difficulty, Some(recommendation))
            }
        };

        let key = cache_key(&request, difficulty);
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, age_ms = hit.age.as_millis(), "serving from result cache");
            return Ok(GenerationOutcome {
                items: hit.payload,
                difficulty,
                recommendation,
                source: Source::Cache,
            });
        }

        let bucket = BankBucket::new(&request.subject, &request.grade);
        if let Some(banked) = self.bank.sample(&bucket, request.count, &request.topics) {
            debug!(bucket = %bucket, count = banked.len(), "serving from item bank");
            return Ok(GenerationOutcome {
                items: banked.into_iter().map(|item| item.0).collect(),
                difficulty,
                recommendation,
                source: Source::Bank,
            });
        }

        let items = self.run_generation(request, difficulty).await?;

        self.cache.put(key, items.clone());
        let gate = Arc::clone(&self.quality_gate);
        let banked = self.bank.append(&bucket, items.iter().cloned().map(BankedItem), |item| {
            gate.accept(&item.0)
        });
        info!(items = items.len(), banked, %difficulty, "generated new items");

        Ok(GenerationOutcome { items, difficulty, recommendation, source: Source::Generated })
    }

    /// Queue, breaker and cache snapshot
    pub fn status(&self) -> HealthReport {
        HealthReport {
            queue: self.queue.status(),
            breaker: self.queue.breaker().status(),
            cache: CacheStatus {
                exact: self.cache.stats(),
                bank_buckets: self.bank.bucket_count(),
                bank_items: self.bank.total_items(),
            },
        }
    }

    pub fn estimator(&self) -> &Arc<AdaptiveEstimator> {
        &self.estimator
    }

    pub fn cache(&self) -> &Arc<ItemCache<C>> {
        &self.cache
    }

    pub fn bank(&self) -> &Arc<ItemBank<BankedItem>> {
        &self.bank
    }

    pub fn queue(&self) -> &Arc<GenerationQueue<C>> {
        &self.queue
    }

    async fn run_generation(
        &self,
        request: GenerationRequest,
        difficulty: DifficultyTier,
    ) -> CoreResult<Vec<GeneratedItem>> {
        let generator = Arc::clone(&self.generator);
        let request = Arc::new(request);

        let handle = self.queue.enqueue_fn(move |ctx: JobContext| {
            let generator = Arc::clone(&generator);
            let request = Arc::clone(&request);
            async move {
                generator
                    .generate(&request, difficulty, &ctx.progress)
                    .await
                    .map_err(|err| Box::new(err) as BoxedError)
            }
        })?;
        debug!(job_id = %handle.id(), %difficulty, "generation job queued");

        Ok(handle.await?)
    }
}

/// Cache key for a request at a resolved difficulty
///
/// Subject is case-folded and topics are order-independent, so equivalent
/// requests share an entry.
pub fn cache_key(request: &GenerationRequest, difficulty: DifficultyTier) -> CacheKey {
    CacheKey::builder()
        .field("subject", request.subject.trim().to_lowercase())
        .field("grade", request.grade.trim())
        .field("count", request.count)
        .list("topics", &request.topics)
        .field("difficulty", difficulty.to_string())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates equivalent requests produce one key.
    ///
    /// Assertions:
    /// - Confirms topic order and subject case do not matter.
    /// - Confirms difficulty and count are part of the key.
    #[test]
    fn test_cache_key_normalization() {
        let a = GenerationRequest::new("u1", "Math", "5", 10).with_topics(["b", "a"]);
        let b = GenerationRequest::new("u2", "math ", "5", 10).with_topics(["a", "b"]);
        assert_eq!(cache_key(&a, DifficultyTier::Medium), cache_key(&b, DifficultyTier::Medium));
        assert_ne!(cache_key(&a, DifficultyTier::Medium), cache_key(&a, DifficultyTier::Hard));

        let fewer = GenerationRequest::new("u1", "Math", "5", 5).with_topics(["a", "b"]);
        assert_ne!(cache_key(&a, DifficultyTier::Medium), cache_key(&fewer, DifficultyTier::Medium));
    }

    #[test]
    fn test_banked_item_topic() {
        let item = GeneratedItem::new("Geometry", "Angles in a triangle?", "180", DifficultyTier::Easy);
        assert_eq!(BankedItem(item).topic(), "Geometry");
    }
}
