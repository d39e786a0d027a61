//! Bounded job queue for calls to a slow, rate-limited dependency
//!
//! ## Features
//!
//! - **Concurrency limit**: at most `max_concurrent` jobs in flight
//! - **Pacing**: a minimum gap between successive starts
//! - **Backpressure**: `enqueue` fails fast with `QueueError::Full`
//! - **Retries**: exponential backoff, re-admitted at the tail (or head)
//! - **Timeouts**: every attempt raced against the item's deadline
//! - **Circuit breaking**: every attempt runs through a shared breaker
//! - **Events**: lifecycle and progress notifications over a broadcast
//!   channel
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use quizgate_common::queue::{JobQueue, QueueConfig, QueueResult};
//! use quizgate_common::resilience::{CircuitBreaker, CircuitBreakerConfig};
//!
//! # async fn example() -> QueueResult<()> {
//! let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()).expect("valid"));
//! let queue: JobQueue<String> = JobQueue::new(QueueConfig::default(), breaker)?;
//!
//! let handle = queue.enqueue_fn(|ctx| async move {
//!     ctx.progress.report(50, "halfway");
//!     Ok("done".to_string())
//! })?;
//! assert_eq!(handle.await?, "done");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod types;
pub mod work;

pub use self::core::{JobHandle, JobQueue, QueueStatus};
pub use self::errors::{QueueError, QueueResult};
pub use self::events::QueueEvent;
pub use self::metrics::{QueueMetrics, QueueStatsSnapshot};
pub use self::types::{ItemStatus, JobId, QueueConfig, QueueConfigUpdate, RetryPlacement};
pub use self::work::{JobContext, ProgressReporter, WorkUnit};
