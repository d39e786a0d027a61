//! Integration tests for `quizgate_common::error`.
//!
//! These suites validate classification and module error delegation so
//! callers of the admission pipeline receive consistent failure semantics.

#![cfg(feature = "foundation")]

use std::time::Duration;

use quizgate_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use quizgate_common::impl_error_classification;
use thiserror::Error;

/// Validates that `CommonError` classification surfaces the expected
/// retryable, severity and criticality combinations for each variant.
#[test]
fn classification_matrix_matches_expected_contract() {
    let cases = vec![
        (CommonError::config("missing generator endpoint"), false, ErrorSeverity::Error, false),
        (CommonError::internal("window underflow"), false, ErrorSeverity::Critical, true),
    ];

    for (err, retryable, severity, critical) in cases {
        assert_eq!(err.is_retryable(), retryable, "retryable mismatch for {err}");
        assert_eq!(err.severity(), severity, "severity mismatch for {err}");
        assert_eq!(err.is_critical(), critical, "critical mismatch for {err}");
        assert!(err.retry_after().is_none());
    }
}

#[derive(Debug, Error)]
enum GeneratorError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("model refused prompt: {0}")]
    Refused(String),

    #[error("rate limited, retry after {wait:?}")]
    RateLimited { wait: Duration },
}

impl_error_classification!(GeneratorError, Common,
    Self::Refused(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::RateLimited { wait } => {
        retryable: true,
        severity: ErrorSeverity::Warning,
        critical: false,
        retry_after: Some(*wait),
    }
);

/// Validates the classification macro delegates to `CommonError` and applies
/// module-specific arms, including retry hints bound from the variant.
#[test]
fn module_error_delegates_classification() {
    let limited = GeneratorError::RateLimited { wait: Duration::from_secs(2) };
    assert!(limited.is_retryable());
    assert_eq!(limited.retry_after(), Some(Duration::from_secs(2)));

    let refused = GeneratorError::Refused("unsafe".into());
    assert!(!refused.is_retryable());
    assert!(refused.retry_after().is_none());

    let internal = GeneratorError::from(CommonError::internal("bad state"));
    assert!(internal.is_critical());
    assert_eq!(internal.severity(), ErrorSeverity::Critical);
}
