//! Generation requests and generated items

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::difficulty::DifficultyTier;
use crate::errors::{QuizgateError, Result};

/// A learner's request for a set of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub user_id: String,
    pub subject: String,
    pub grade: String,
    pub count: usize,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Explicit tier; skips the estimator when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyTier>,
}

impl GenerationRequest {
    pub fn new(
        user_id: impl Into<String>,
        subject: impl Into<String>,
        grade: impl Into<String>,
        count: usize,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            subject: subject.into(),
            grade: grade.into(),
            count,
            topics: Vec::new(),
            difficulty: None,
        }
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_difficulty(mut self, difficulty: DifficultyTier) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Reject requests the generator cannot serve
    ///
    /// # Errors
    /// Returns `QuizgateError::InvalidInput` for an empty subject or grade,
    /// or a zero count.
    pub fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() {
            return Err(QuizgateError::InvalidInput("subject must not be empty".into()));
        }
        if self.grade.trim().is_empty() {
            return Err(QuizgateError::InvalidInput("grade must not be empty".into()));
        }
        if self.count == 0 {
            return Err(QuizgateError::InvalidInput("count must be greater than 0".into()));
        }
        Ok(())
    }
}

/// One item produced by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedItem {
    pub id: Uuid,
    pub topic: String,
    pub prompt: String,
    pub answer: String,
    pub difficulty: DifficultyTier,
    /// Generator-reported quality, 0.0-1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f32>,
}

impl GeneratedItem {
    pub fn new(
        topic: impl Into<String>,
        prompt: impl Into<String>,
        answer: impl Into<String>,
        difficulty: DifficultyTier,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            prompt: prompt.into(),
            answer: answer.into(),
            difficulty,
            quality_score: None,
        }
    }

    pub fn with_quality(mut self, score: f32) -> Self {
        self.quality_score = Some(score);
        self
    }
}
