//! Shared admission-control building blocks for the quizgate crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error types and classification
//! - `observability`: tracing instrumentation (implied by `runtime`)
//! - `runtime`: async infrastructure (circuit breaker, result cache, item
//!   bank, job queue)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod queue;
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{
    BankBucket, BankEntry, CacheConfig, CacheKey, CacheStats, CacheStatus, CachedPayload,
    ItemBank, ResultCache,
};
#[cfg(feature = "foundation")]
pub use error::{CommonError, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use queue::{
    JobContext, JobHandle, JobId, JobQueue, ProgressReporter, QueueConfig, QueueConfigUpdate,
    QueueError, QueueEvent, QueueResult, QueueStatus, RetryPlacement, WorkUnit,
};
#[cfg(feature = "runtime")]
pub use resilience::{
    BoxedError, BreakerStatus, CircuitBreaker, CircuitBreakerConfig, CircuitState, Clock,
    MockClock, ResilienceError, ResilienceResult, SystemClock,
};
