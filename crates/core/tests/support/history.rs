//! In-memory history store

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use quizgate_core::HistoryRepository;
use quizgate_domain::{
    DifficultyTier, HistoricalOutcomeRecord, ItemOutcome, QuizgateError, Result as DomainResult,
};

type HistoryKey = (String, String, String);

/// In-memory mock for `HistoryRepository`.
///
/// Records are stored newest first per (user, subject, grade). A store can
/// be switched into failure mode to exercise error propagation.
#[derive(Default, Clone)]
pub struct InMemoryHistory {
    records: Arc<Mutex<HashMap<HistoryKey, Vec<HistoricalOutcomeRecord>>>>,
    failure: Option<String>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read fails
    pub fn failing(message: &str) -> Self {
        Self { failure: Some(message.to_string()), ..Self::default() }
    }

    /// Seed records for a learner, newest first
    pub fn with_records(
        self,
        user_id: &str,
        subject: &str,
        grade: &str,
        records: Vec<HistoricalOutcomeRecord>,
    ) -> Self {
        self.records
            .lock()
            .expect("history mutex poisoned")
            .insert((user_id.into(), subject.into(), grade.into()), records);
        self
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistory {
    async fn recent_outcomes(
        &self,
        user_id: &str,
        subject: &str,
        grade: &str,
        limit: usize,
    ) -> DomainResult<Vec<HistoricalOutcomeRecord>> {
        if let Some(message) = &self.failure {
            return Err(QuizgateError::History(message.clone()));
        }
        let records = self.records.lock().expect("history mutex poisoned");
        Ok(records
            .get(&(user_id.into(), subject.into(), grade.into()))
            .map(|records| records.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// `count` sessions at the same score and tier, one day apart, newest first
pub fn uniform_records(
    count: usize,
    score: f64,
    difficulty: DifficultyTier,
    secs_per_item: Option<f64>,
) -> Vec<HistoricalOutcomeRecord> {
    (0..count)
        .map(|day| HistoricalOutcomeRecord {
            score,
            difficulty,
            items: (0..5)
                .map(|n| {
                    let item = ItemOutcome::new(if n % 2 == 0 { "fractions" } else { "decimals" }, true);
                    match secs_per_item {
                        Some(secs) => item.with_time(secs),
                        None => item,
                    }
                })
                .collect(),
            completed_at: Utc::now() - Duration::days(i64::try_from(day).unwrap_or(i64::MAX)),
        })
        .collect()
}
