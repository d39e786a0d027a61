use std::time::Duration;

use thiserror::Error;

use crate::error::{CommonError, ErrorSeverity};
use crate::resilience::{BoxedError, ResilienceError};
use crate::impl_error_classification;

/// Job queue errors
///
/// Callers can tell three situations apart:
///
/// - back off and resubmit: `Full`
/// - the job itself failed: `Failed`, `Timeout`
/// - the dependency is down: `CircuitOpen`
///
/// Only the final outcome of a job is surfaced; intermediate attempt
/// failures are retried inside the queue.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Queue is at maximum capacity ({capacity})")]
    Full { capacity: usize },

    #[error("Job was cleared from the queue before it started")]
    Cleared,

    #[error("Queue is shutting down")]
    ShuttingDown,

    #[error("Circuit breaker is open, retry after {retry_after:?}")]
    CircuitOpen { retry_after: Duration },

    #[error("Job timed out after {timeout:?} ({attempts} attempts)")]
    Timeout { timeout: Duration, attempts: u32 },

    #[error("Job failed after {attempts} attempts: {source}")]
    Failed {
        attempts: u32,
        #[source]
        source: BoxedError,
    },

    #[error("Job was dropped by the queue before completion")]
    Closed,
}

impl QueueError {
    /// Map a breaker outcome for the given attempt number
    pub(crate) fn from_attempt(error: ResilienceError<BoxedError>, attempts: u32) -> Self {
        match error {
            ResilienceError::CircuitOpen { retry_after } => Self::CircuitOpen { retry_after },
            ResilienceError::Timeout { timeout } => Self::Timeout { timeout, attempts },
            ResilienceError::Failed(source) => Self::Failed { attempts, source },
        }
    }

    /// Reject invalid queue settings
    pub(crate) fn invalid_config(message: String) -> Self {
        Self::Common(CommonError::config(message))
    }
}

impl_error_classification!(QueueError, Common,
    Self::Full { .. } => {
        retryable: true,  // Space frees up as jobs finish
        severity: ErrorSeverity::Warning,
        critical: false,
        retry_after: Some(Duration::from_millis(500)),
    },
    Self::Cleared => {
        retryable: true,
        severity: ErrorSeverity::Info,
        critical: false,
    },
    Self::ShuttingDown => {
        retryable: false,
        severity: ErrorSeverity::Info,
        critical: false,
    },
    Self::CircuitOpen { retry_after } => {
        retryable: true,
        severity: ErrorSeverity::Warning,
        critical: false,
        retry_after: Some(*retry_after),
    },
    Self::Timeout { .. } => {
        retryable: true,
        severity: ErrorSeverity::Warning,
        critical: false,
    },
    Self::Failed { .. } => {
        retryable: false,  // Retries already exhausted
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::Closed => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    }
);

/// Queue operation result type
pub type QueueResult<T> = Result<T, QueueError>;
