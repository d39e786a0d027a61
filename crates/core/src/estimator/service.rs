//! Adaptive difficulty estimator - core business logic
//!
//! Turns a learner's recent completed sessions into a recommended
//! [`DifficultyTier`] with a confidence label and a readable reason.
//!
//! ## Rules
//!
//! 1. No history: `medium`, low confidence.
//! 2. Recency-weighted average score, weight `1 / (i + 1)` for the i-th most
//!    recent record.
//! 3. Score bands:
//!    - `>= 85`: one tier above the latest session (saturating), high
//!    - `[70, 85)`: medium, or hard when the last three medium-tier sessions
//!      all reached 80, high
//!    - `[50, 70)`: medium, or easy when the last three sessions all stayed
//!      below 60, medium confidence
//!    - `< 50`: easy, high
//! 4. Slow pace (average seconds per item above the configured limit) eases
//!    the tier by one step.
//! 5. Low accuracy on the requested topics forces `easy`, high confidence.

use std::collections::BTreeMap;
use std::sync::Arc;

use quizgate_domain::constants::{
    ESCALATE_SCORE, PASSING_SCORE, STEADY_SCORE, STREAK_DOWNGRADE_SCORE, STREAK_ESCALATE_SCORE,
    STREAK_LENGTH,
};
use quizgate_domain::{Confidence, DifficultyTier, EstimatorSettings, HistoricalOutcomeRecord};
use serde::Serialize;
use tracing::{debug, instrument};

use super::ports::HistoryRepository;
use crate::errors::CoreResult;

/// Recommended tier with its supporting evidence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub difficulty: DifficultyTier,
    pub confidence: Confidence,
    pub reason: String,
    pub metrics: EstimatorMetrics,
}

/// Numbers behind a recommendation, for observability
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EstimatorMetrics {
    pub weighted_average: Option<f64>,
    pub record_count: usize,
    pub avg_secs_per_item: Option<f64>,
    pub tier_breakdown: BTreeMap<DifficultyTier, TierStats>,
    /// Percent correct on the requested topics, when any items matched
    pub topic_accuracy: Option<f64>,
}

/// Per-tier score summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierStats {
    pub records: usize,
    pub average_score: f64,
}

/// Adaptive difficulty estimator
pub struct AdaptiveEstimator {
    history: Arc<dyn HistoryRepository>,
    settings: EstimatorSettings,
}

impl AdaptiveEstimator {
    /// Create a new estimator
    pub fn new(history: Arc<dyn HistoryRepository>, settings: EstimatorSettings) -> Self {
        Self { history, settings }
    }

    pub fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    /// Fetch recent history and recommend a tier
    ///
    /// # Errors
    /// Returns `CoreError::Domain` when the history store fails.
    #[instrument(skip(self, topics), fields(topics = topics.len()))]
    pub async fn recommend(
        &self,
        user_id: &str,
        subject: &str,
        grade: &str,
        topics: &[String],
    ) -> CoreResult<Recommendation> {
        let records = self
            .history
            .recent_outcomes(user_id, subject, grade, self.settings.history_limit)
            .await?;

        let recommendation = self.evaluate(&records, topics);
        debug!(
            difficulty = %recommendation.difficulty,
            confidence = %recommendation.confidence,
            records = recommendation.metrics.record_count,
            "difficulty recommended"
        );
        Ok(recommendation)
    }

    /// Recommend a tier from records ordered newest first
    ///
    /// Pure function of its inputs; records past `history_limit` are ignored.
    pub fn evaluate(&self, records: &[HistoricalOutcomeRecord], topics: &[String]) -> Recommendation {
        let records = &records[..records.len().min(self.settings.history_limit)];
        let Some(latest) = records.first() else {
            return Recommendation {
                difficulty: DifficultyTier::Medium,
                confidence: Confidence::Low,
                reason: "no history".to_string(),
                metrics: EstimatorMetrics::default(),
            };
        };

        let weighted = weighted_average(records);
        let (mut difficulty, mut confidence, mut reason) =
            classify(weighted, latest.difficulty, records);

        let avg_secs_per_item = average_secs_per_item(records);
        if let Some(secs) = avg_secs_per_item.filter(|secs| *secs > self.settings.slow_item_secs) {
            difficulty = difficulty.downgrade();
            reason.push_str(&format!("; eased one tier, averaging {secs:.0}s per item"));
        }

        let topic_accuracy = topic_accuracy(records, topics);
        if let Some(accuracy) =
            topic_accuracy.filter(|accuracy| *accuracy < self.settings.topic_accuracy_floor)
        {
            let struggling = struggling_topics(records, topics, self.settings.topic_accuracy_floor);
            difficulty = DifficultyTier::Easy;
            confidence = Confidence::High;
            reason = format!("struggling with {} ({accuracy:.0}% correct)", struggling.join(", "));
        }

        Recommendation {
            difficulty,
            confidence,
            reason,
            metrics: EstimatorMetrics {
                weighted_average: Some(weighted),
                record_count: records.len(),
                avg_secs_per_item,
                tier_breakdown: tier_breakdown(records),
                topic_accuracy,
            },
        }
    }
}

fn classify(
    weighted: f64,
    latest: DifficultyTier,
    records: &[HistoricalOutcomeRecord],
) -> (DifficultyTier, Confidence, String) {
    if weighted >= ESCALATE_SCORE {
        let tier = latest.escalate();
        let reason = if tier == latest {
            format!("weighted average {weighted:.1}, staying at {latest}")
        } else {
            format!("weighted average {weighted:.1}, stepping up from {latest}")
        };
        return (tier, Confidence::High, reason);
    }

    if weighted >= STEADY_SCORE {
        let medium: Vec<f64> = records
            .iter()
            .filter(|record| record.difficulty == DifficultyTier::Medium)
            .take(STREAK_LENGTH)
            .map(|record| record.score)
            .collect();
        if medium.len() == STREAK_LENGTH && medium.iter().all(|score| *score >= STREAK_ESCALATE_SCORE)
        {
            return (
                DifficultyTier::Hard,
                Confidence::High,
                format!("last {STREAK_LENGTH} medium sessions all scored {STREAK_ESCALATE_SCORE:.0}+"),
            );
        }
        return (
            DifficultyTier::Medium,
            Confidence::High,
            format!("weighted average {weighted:.1}, holding at medium"),
        );
    }

    if weighted >= PASSING_SCORE {
        let recent: Vec<f64> = records.iter().take(STREAK_LENGTH).map(|record| record.score).collect();
        if recent.len() == STREAK_LENGTH && recent.iter().all(|score| *score < STREAK_DOWNGRADE_SCORE)
        {
            return (
                DifficultyTier::Easy,
                Confidence::Medium,
                format!("last {STREAK_LENGTH} sessions all below {STREAK_DOWNGRADE_SCORE:.0}"),
            );
        }
        return (
            DifficultyTier::Medium,
            Confidence::Medium,
            format!("weighted average {weighted:.1}, holding at medium"),
        );
    }

    (
        DifficultyTier::Easy,
        Confidence::High,
        format!("weighted average {weighted:.1} is below {PASSING_SCORE:.0}"),
    )
}

#[allow(clippy::cast_precision_loss)]
fn weighted_average(records: &[HistoricalOutcomeRecord]) -> f64 {
    let (weighted_sum, weight_sum) =
        records.iter().enumerate().fold((0.0, 0.0), |(sum, weights), (index, record)| {
            let weight = 1.0 / (index + 1) as f64;
            (sum + record.score * weight, weights + weight)
        });
    weighted_sum / weight_sum
}

#[allow(clippy::cast_precision_loss)]
fn average_secs_per_item(records: &[HistoricalOutcomeRecord]) -> Option<f64> {
    let (total, count) = records
        .iter()
        .flat_map(HistoricalOutcomeRecord::timed_items)
        .fold((0.0, 0_usize), |(total, count), secs| (total + secs, count + 1));
    (count > 0).then(|| total / count as f64)
}

#[allow(clippy::cast_precision_loss)]
fn accuracy<'a>(items: impl Iterator<Item = &'a quizgate_domain::ItemOutcome>) -> Option<f64> {
    let (correct, total) =
        items.fold((0_usize, 0_usize), |(correct, total), item| {
            (correct + usize::from(item.correct), total + 1)
        });
    (total > 0).then(|| correct as f64 * 100.0 / total as f64)
}

fn topic_accuracy(records: &[HistoricalOutcomeRecord], topics: &[String]) -> Option<f64> {
    if topics.is_empty() {
        return None;
    }
    accuracy(records.iter().flat_map(|record| record.items_for_topics(topics)))
}

/// Requested topics below the floor; all requested topics with data when no
/// single topic is below it on its own
fn struggling_topics(
    records: &[HistoricalOutcomeRecord],
    topics: &[String],
    floor: f64,
) -> Vec<String> {
    let per_topic: Vec<(&String, f64)> = topics
        .iter()
        .filter_map(|topic| {
            let single = std::slice::from_ref(topic);
            accuracy(records.iter().flat_map(|record| record.items_for_topics(single)))
                .map(|accuracy| (topic, accuracy))
        })
        .collect();

    let below: Vec<String> = per_topic
        .iter()
        .filter(|(_, accuracy)| *accuracy < floor)
        .map(|(topic, _)| (*topic).clone())
        .collect();

    if below.is_empty() {
        per_topic.into_iter().map(|(topic, _)| topic.clone()).collect()
    } else {
        below
    }
}

#[allow(clippy::cast_precision_loss)]
fn tier_breakdown(records: &[HistoricalOutcomeRecord]) -> BTreeMap<DifficultyTier, TierStats> {
    let mut sums: BTreeMap<DifficultyTier, (usize, f64)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(record.difficulty).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.score;
    }
    sums.into_iter()
        .map(|(tier, (count, total))| {
            (tier, TierStats { records: count, average_score: total / count as f64 })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use quizgate_domain::{ItemOutcome, Result as DomainResult};

    use super::*;

    struct NoHistory;

    #[async_trait]
    impl HistoryRepository for NoHistory {
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

    fn estimator() -> AdaptiveEstimator {
        AdaptiveEstimator::new(Arc::new(NoHistory), EstimatorSettings::default())
    }

    fn record(score: f64, difficulty: DifficultyTier, age_days: i64) -> HistoricalOutcomeRecord {
        HistoricalOutcomeRecord {
            score,
            difficulty,
            items: Vec::new(),
            completed_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn records(scores: &[f64], difficulty: DifficultyTier) -> Vec<HistoricalOutcomeRecord> {
        scores
            .iter()
            .enumerate()
            .map(|(age, score)| record(*score, difficulty, age as i64))
            .collect()
    }

    #[test]
    fn test_no_history() {
        let rec = estimator().evaluate(&[], &[]);
        assert_eq!(rec.difficulty, DifficultyTier::Medium);
        assert_eq!(rec.confidence, Confidence::Low);
        assert_eq!(rec.reason, "no history");
        assert_eq!(rec.metrics.record_count, 0);
    }

    /// Validates the recency weighting.
    ///
    /// Assertions:
    /// - Confirms `[90, 60]` averages to `(90 + 30) / 1.5 = 80`.
    #[test]
    fn test_weighted_average_favours_recent() {
        let history = records(&[90.0, 60.0], DifficultyTier::Medium);
        assert!((weighted_average(&history) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_escalate_saturates_at_hard() {
        let rec = estimator().evaluate(&records(&[95.0; 4], DifficultyTier::Hard), &[]);
        assert_eq!(rec.difficulty, DifficultyTier::Hard);
        assert_eq!(rec.confidence, Confidence::High);
        assert!(rec.reason.contains("staying at hard"));
    }

    #[test]
    fn test_steady_band_escalates_on_medium_streak() {
        let rec = estimator().evaluate(&records(&[82.0, 81.0, 80.0, 40.0], DifficultyTier::Medium), &[]);
        assert_eq!(rec.difficulty, DifficultyTier::Hard);
        assert_eq!(rec.confidence, Confidence::High);
    }

    #[test]
    fn test_steady_band_holds_without_streak() {
        let rec = estimator().evaluate(&records(&[78.0, 75.0, 79.0], DifficultyTier::Medium), &[]);
        assert_eq!(rec.difficulty, DifficultyTier::Medium);
        assert_eq!(rec.confidence, Confidence::High);
    }

    #[test]
    fn test_passing_band_downgrades_on_low_streak() {
        // Weighted: (59 + 27.5 + 18.33 + 20) / 2.083 ~ 60
        let rec = estimator().evaluate(&records(&[59.0, 55.0, 55.0, 80.0], DifficultyTier::Medium), &[]);
        assert_eq!(rec.difficulty, DifficultyTier::Easy);
        assert_eq!(rec.confidence, Confidence::Medium);
    }

    #[test]
    fn test_low_scores_drop_to_easy() {
        let rec = estimator().evaluate(&records(&[30.0, 45.0], DifficultyTier::Medium), &[]);
        assert_eq!(rec.difficulty, DifficultyTier::Easy);
        assert_eq!(rec.confidence, Confidence::High);
    }

    /// Validates low topic accuracy overrides the score band.
    ///
    /// Assertions:
    /// - Confirms tier is forced to easy even with a 90 average.
    /// - Confirms only the weak topic is named.
    #[test]
    fn test_topic_accuracy_forces_easy() {
        let mut history = records(&[90.0, 90.0], DifficultyTier::Medium);
        for record in &mut history {
            record.items = vec![
                ItemOutcome::new("fractions", false),
                ItemOutcome::new("fractions", false),
                ItemOutcome::new("geometry", true),
            ];
        }
        let topics = vec!["Fractions".to_string(), "geometry".to_string()];

        let rec = estimator().evaluate(&history, &topics);
        assert_eq!(rec.difficulty, DifficultyTier::Easy);
        assert_eq!(rec.confidence, Confidence::High);
        assert!(rec.reason.contains("Fractions"));
        assert!(!rec.reason.contains("geometry"));
        let accuracy = rec.metrics.topic_accuracy.expect("topic items matched");
        assert!((accuracy - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_tier_breakdown_groups_by_tier() {
        let history = vec![
            record(90.0, DifficultyTier::Hard, 0),
            record(70.0, DifficultyTier::Medium, 1),
            record(80.0, DifficultyTier::Medium, 2),
        ];
        let rec = estimator().evaluate(&history, &[]);
        let medium = rec.metrics.tier_breakdown[&DifficultyTier::Medium];
        assert_eq!(medium.records, 2);
        assert!((medium.average_score - 75.0).abs() < 1e-9);
        assert!(!rec.metrics.tier_breakdown.contains_key(&DifficultyTier::Easy));
    }

    #[test]
    fn test_history_limit_truncates() {
        let settings = EstimatorSettings { history_limit: 2, ..Default::default() };
        let estimator = AdaptiveEstimator::new(Arc::new(NoHistory), settings);
        let rec = estimator.evaluate(&records(&[90.0, 90.0, 10.0, 10.0], DifficultyTier::Easy), &[]);
        assert_eq!(rec.metrics.record_count, 2);
        assert_eq!(rec.difficulty, DifficultyTier::Medium);
    }
}
