//! Historical outcome records read by the difficulty estimator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyTier;

/// One answered item inside a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub topic: String,
    pub correct: bool,
    /// Seconds spent on the item, when the client recorded it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_secs: Option<f64>,
}

impl ItemOutcome {
    pub fn new(topic: impl Into<String>, correct: bool) -> Self {
        Self { topic: topic.into(), correct, time_spent_secs: None }
    }

    pub fn with_time(mut self, secs: f64) -> Self {
        self.time_spent_secs = Some(secs);
        self
    }
}

/// A completed session for one subject and grade
///
/// Read-only input to the estimator; owned by the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalOutcomeRecord {
    /// Session score, 0-100
    pub score: f64,
    pub difficulty: DifficultyTier,
    #[serde(default)]
    pub items: Vec<ItemOutcome>,
    pub completed_at: DateTime<Utc>,
}

impl HistoricalOutcomeRecord {
    /// Items that carry a recorded time
    pub fn timed_items(&self) -> impl Iterator<Item = f64> + '_ {
        self.items.iter().filter_map(|item| item.time_spent_secs)
    }

    /// Whether an item's topic matches any of `topics` (case-insensitive)
    pub fn items_for_topics<'a>(
        &'a self,
        topics: &'a [String],
    ) -> impl Iterator<Item = &'a ItemOutcome> + 'a {
        self.items
            .iter()
            .filter(move |item| topics.iter().any(|topic| topic.eq_ignore_ascii_case(&item.topic)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> HistoricalOutcomeRecord {
        HistoricalOutcomeRecord {
            score: 75.0,
            difficulty: DifficultyTier::Medium,
            items: vec![
                ItemOutcome::new("Fractions", true).with_time(30.0),
                ItemOutcome::new("geometry", false),
                ItemOutcome::new("fractions", false).with_time(50.0),
            ],
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_timed_items_skip_missing() {
        let times: Vec<f64> = record().timed_items().collect();
        assert_eq!(times, vec![30.0, 50.0]);
    }

    #[test]
    fn test_topic_filter_is_case_insensitive() {
        let record = record();
        let topics = vec!["FRACTIONS".to_string()];
        assert_eq!(record.items_for_topics(&topics).count(), 2);
    }

    #[test]
    fn test_deserialize_without_items() {
        let json = r#"{"score": 91.5, "difficulty": "hard", "completed_at": "2026-03-01T10:00:00Z"}"#;
        let parsed: HistoricalOutcomeRecord = serde_json::from_str(json).expect("valid record");
        assert_eq!(parsed.difficulty, DifficultyTier::Hard);
        assert!(parsed.items.is_empty());
    }
}
