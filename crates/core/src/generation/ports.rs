//! Port interfaces for item generation

use async_trait::async_trait;
use quizgate_common::queue::ProgressReporter;
use quizgate_domain::{DifficultyTier, GeneratedItem, GenerationRequest, Result};

/// The slow, rate-limited dependency that produces items
///
/// Called only from inside the job queue, once per attempt.
#[async_trait]
pub trait ItemGenerator: Send + Sync {
    /// Produce `request.count` items at `difficulty`
    ///
    /// `progress` publishes progress events for the running job.
    async fn generate(
        &self,
        request: &GenerationRequest,
        difficulty: DifficultyTier,
        progress: &ProgressReporter,
    ) -> Result<Vec<GeneratedItem>>;
}

/// Decides which generated items are worth keeping in the item bank
pub trait QualityGate: Send + Sync {
    fn accept(&self, item: &GeneratedItem) -> bool;
}

/// Accepts items whose reported quality reaches a minimum
///
/// Items without a quality score are rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinQualityGate {
    min_quality: f32,
}

impl MinQualityGate {
    pub fn new(min_quality: f32) -> Self {
        Self { min_quality }
    }
}

impl QualityGate for MinQualityGate {
    fn accept(&self, item: &GeneratedItem) -> bool {
        item.quality_score.is_some_and(|score| score >= self.min_quality)
    }
}
