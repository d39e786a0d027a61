//! Error type for core services

use quizgate_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use quizgate_common::impl_error_classification;
use quizgate_common::queue::QueueError;
use quizgate_domain::QuizgateError;
use thiserror::Error;

/// Errors surfaced by the estimator and the admission pipeline
///
/// Queue errors pass through unchanged so callers can still tell a full
/// queue from a failed job or an open circuit.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Domain(#[from] QuizgateError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

impl_error_classification!(CoreError, Common,
    Self::Queue(inner) => {
        retryable: ErrorClassification::is_retryable(inner),
        severity: ErrorClassification::severity(inner),
        critical: ErrorClassification::is_critical(inner),
        retry_after: ErrorClassification::retry_after(inner),
    },
    Self::Domain(inner) => {
        retryable: matches!(inner, QuizgateError::History(_) | QuizgateError::Generator(_)),
        severity: domain_severity(inner),
        critical: matches!(inner, QuizgateError::Internal(_)),
    }
);

fn domain_severity(error: &QuizgateError) -> ErrorSeverity {
    match error {
        QuizgateError::NotFound(_) => ErrorSeverity::Info,
        QuizgateError::History(_) | QuizgateError::Generator(_) => ErrorSeverity::Warning,
        QuizgateError::Internal(_) => ErrorSeverity::Critical,
        QuizgateError::Config(_) | QuizgateError::InvalidInput(_) => ErrorSeverity::Error,
    }
}
