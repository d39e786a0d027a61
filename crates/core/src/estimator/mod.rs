//! Adaptive difficulty estimation from a learner's history

pub mod ports;
pub mod service;

pub use service::{AdaptiveEstimator, EstimatorMetrics, Recommendation, TierStats};
