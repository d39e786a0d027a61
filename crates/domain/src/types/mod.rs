//! Domain types and models

pub mod difficulty;
pub mod generation;
pub mod history;

pub use difficulty::{Confidence, DifficultyTier};
pub use generation::{GeneratedItem, GenerationRequest};
pub use history::{HistoricalOutcomeRecord, ItemOutcome};
