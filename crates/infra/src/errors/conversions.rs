//! Conversions from component errors into domain errors.

use quizgate_common::error::CommonError;
use quizgate_common::queue::QueueError;
use quizgate_common::resilience::ConfigError;
use quizgate_domain::QuizgateError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub QuizgateError);

impl From<InfraError> for QuizgateError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<QuizgateError> for InfraError {
    fn from(value: QuizgateError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoQuizgateError {
    fn into_quizgate(self) -> QuizgateError;
}

impl IntoQuizgateError for ConfigError {
    fn into_quizgate(self) -> QuizgateError {
        match self {
            ConfigError::Invalid { message } => QuizgateError::Config(message),
        }
    }
}

impl IntoQuizgateError for QueueError {
    fn into_quizgate(self) -> QuizgateError {
        match self {
            QueueError::Common(CommonError::Config { message }) => QuizgateError::Config(message),
            other => QuizgateError::Internal(other.to_string()),
        }
    }
}

impl From<ConfigError> for InfraError {
    fn from(value: ConfigError) -> Self {
        InfraError(value.into_quizgate())
    }
}

impl From<QueueError> for InfraError {
    fn from(value: QueueError) -> Self {
        InfraError(value.into_quizgate())
    }
}
