//! Integration tests for the resilience module
//!
//! Drives the circuit breaker through full Closed → Open → HalfOpen cycles
//! with a mock clock.

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use quizgate_common::resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, MockClock, ResilienceError,
};

/// Custom error type for testing
#[derive(Debug, Clone)]
struct GeneratorError(&'static str);

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "generator error: {}", self.0)
    }
}

impl std::error::Error for GeneratorError {}

fn breaker(clock: &MockClock) -> CircuitBreaker<MockClock> {
    CircuitBreakerConfig::builder()
        .volume_threshold(3)
        .error_threshold_percentage(50.0)
        .reset_timeout(Duration::from_secs(60))
        .clock(clock.clone())
        .build()
        .expect("valid breaker config")
}

/// Validates the trip-and-probe cycle.
///
/// # Test Steps
/// 1. Three consecutive failures with `volume_threshold = 3`
/// 2. Verify the breaker is open and rejects without invoking
/// 3. Advance the clock past `reset_timeout`
/// 4. Verify the next call is executed in HalfOpen
#[tokio::test(flavor = "multi_thread")]
async fn test_trip_then_half_open_probe() {
    let clock = MockClock::new();
    let breaker = breaker(&clock);
    let invocations = Arc::new(AtomicU32::new(0));

    for _ in 0..3 {
        let counter = Arc::clone(&invocations);
        let result = breaker
            .execute(|| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(GeneratorError("503"))
            })
            .await;
        assert!(matches!(result, Err(ResilienceError::Failed(GeneratorError("503")))));
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    let counter = Arc::clone(&invocations);
    let rejected = breaker
        .execute(|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, GeneratorError>(())
        })
        .await;
    assert!(matches!(rejected, Err(ResilienceError::CircuitOpen { .. })));
    assert_eq!(invocations.load(Ordering::SeqCst), 3);

    clock.advance(Duration::from_secs(60));

    let counter = Arc::clone(&invocations);
    let probe = breaker
        .execute(|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, GeneratorError>("probe")
        })
        .await;
    assert_eq!(probe.expect("probe executes"), "probe");
    assert_eq!(invocations.load(Ordering::SeqCst), 4);
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
}

/// Validates a full recovery back to Closed.
///
/// # Test Steps
/// 1. Trip the breaker
/// 2. Wait out the cooldown
/// 3. Three consecutive successes close it
/// 4. Status reports a clean window and lifetime counters
#[tokio::test(flavor = "multi_thread")]
async fn test_full_recovery_cycle() {
    let clock = MockClock::new();
    let breaker = breaker(&clock);

    for _ in 0..3 {
        let _ = breaker.execute(|| async { Err::<(), _>(GeneratorError("timeout")) }).await;
    }
    let _ = breaker.execute(|| async { Ok::<_, GeneratorError>(()) }).await;

    clock.advance(Duration::from_secs(61));
    for _ in 0..3 {
        breaker
            .execute(|| async { Ok::<_, GeneratorError>(()) })
            .await
            .expect("half-open call succeeds");
    }

    let status = breaker.status();
    assert_eq!(status.state, CircuitState::Closed);
    assert_eq!(status.window_len, 0);
    assert_eq!(status.total_calls, 6);
    assert_eq!(status.rejected_calls, 1);
    assert_eq!(status.total_failures, 3);
}

/// Validates a mixed window below the error threshold stays closed.
#[tokio::test(flavor = "multi_thread")]
async fn test_mixed_outcomes_below_threshold() {
    let clock = MockClock::new();
    let breaker = CircuitBreakerConfig::builder()
        .volume_threshold(4)
        .error_threshold_percentage(75.0)
        .clock(clock.clone())
        .build()
        .expect("valid breaker config");

    for i in 0..8 {
        let fail = i % 2 == 0;
        let _ = breaker
            .execute(|| async move {
                if fail {
                    Err(GeneratorError("flaky"))
                } else {
                    Ok(())
                }
            })
            .await;
    }

    let status = breaker.status();
    assert_eq!(status.state, CircuitState::Closed);
    assert!((status.error_rate - 50.0).abs() < f64::EPSILON);
}

/// Validates the status serializes for an ops endpoint.
#[tokio::test]
async fn test_status_serializes() {
    let breaker = breaker(&MockClock::new());
    let json = serde_json::to_value(breaker.status()).expect("status serializes");
    assert_eq!(json["state"], "CLOSED");
    assert_eq!(json["retry_after_ms"], serde_json::Value::Null);
}
