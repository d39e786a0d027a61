//! # Quizgate Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The adaptive difficulty estimator
//! - The admission pipeline in front of the item generator
//! - Port interfaces (traits) for history storage and generation
//!
//! ## Architecture Principles
//! - Depends only on `quizgate-common` and `quizgate-domain`
//! - No database, HTTP, or model-provider code
//! - All external dependencies via traits

pub mod errors;
pub mod estimator;
pub mod generation;

// Re-export specific items to avoid ambiguity
pub use errors::{CoreError, CoreResult};
pub use estimator::ports::HistoryRepository;
pub use estimator::{AdaptiveEstimator, EstimatorMetrics, Recommendation, TierStats};
pub use generation::ports::{ItemGenerator, MinQualityGate, QualityGate};
pub use generation::{AdmissionPipeline, GenerationOutcome, HealthReport, Source};
