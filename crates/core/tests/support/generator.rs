//! Scripted item generator

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quizgate_common::queue::ProgressReporter;
use quizgate_core::ItemGenerator;
use quizgate_domain::{
    DifficultyTier, GeneratedItem, GenerationRequest, QuizgateError, Result as DomainResult,
};

/// Generator fake that counts calls and can fail its first attempts
///
/// Items cycle through the request's topics (or `"general"`) and carry the
/// configured quality score.
#[derive(Clone)]
pub struct ScriptedGenerator {
    calls: Arc<AtomicU32>,
    failures_before_success: u32,
    quality: f32,
    difficulties: Arc<Mutex<Vec<DifficultyTier>>>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self {
            calls: Arc::new(AtomicU32::new(0)),
            failures_before_success: 0,
            quality: 0.9,
            difficulties: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `failures` calls with a generator error
    pub fn failing_first(mut self, failures: u32) -> Self {
        self.failures_before_success = failures;
        self
    }

    /// Quality score stamped on every item
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Difficulty passed to each call, in order
    pub fn difficulties(&self) -> Vec<DifficultyTier> {
        self.difficulties.lock().expect("generator mutex poisoned").clone()
    }
}

#[async_trait]
impl ItemGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
        difficulty: DifficultyTier,
        progress: &ProgressReporter,
    ) -> DomainResult<Vec<GeneratedItem>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.difficulties.lock().expect("generator mutex poisoned").push(difficulty);

        if call < self.failures_before_success {
            return Err(QuizgateError::Generator(format!("upstream 503 on call {}", call + 1)));
        }

        progress.report(50, "drafting items");
        let items = (0..request.count)
            .map(|n| {
                let topic = if request.topics.is_empty() {
                    "general"
                } else {
                    request.topics[n % request.topics.len()].as_str()
                };
                GeneratedItem::new(topic, format!("Question {n}"), format!("Answer {n}"), difficulty)
                    .with_quality(self.quality)
            })
            .collect();
        progress.report(100, "done");
        Ok(items)
    }
}
