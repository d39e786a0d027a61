//! Port interfaces for the difficulty estimator

use async_trait::async_trait;
use quizgate_domain::{HistoricalOutcomeRecord, Result};

/// Read access to a learner's completed sessions
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Most recent completed records for a subject and grade, newest first
    ///
    /// Implementations return at most `limit` records.
    async fn recent_outcomes(
        &self,
        user_id: &str,
        subject: &str,
        grade: &str,
        limit: usize,
    ) -> Result<Vec<HistoricalOutcomeRecord>>;
}
