//! Circuit breaker with a rolling error-rate window
//!
//! The breaker trips when, within the last `window_size`, at least
//! `volume_threshold` calls were observed and the failure percentage reached
//! `error_threshold_percentage`. While open, calls are rejected without
//! touching the protected dependency until `reset_timeout` has elapsed. The
//! first call after that runs in half-open mode; `volume_threshold`
//! consecutive successes close the circuit and a single failure re-opens it.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::clock::{Clock, SystemClock};
use super::window::ErrorRateWindow;

//==============================================================================
// Error Types
//==============================================================================

/// Simple configuration error for validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Errors produced by a breaker-protected call
///
/// Generic over the wrapped operation's error so the original failure is
/// handed back unchanged in [`ResilienceError::Failed`].
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    /// Circuit is open and still cooling down; the operation was not invoked
    #[error("Circuit breaker is open, retry after {retry_after:?}")]
    CircuitOpen { retry_after: Duration },

    /// Operation did not settle within the deadline
    #[error("Operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The underlying operation failed
    #[error("Operation failed: {0}")]
    Failed(E),
}

impl<E> ResilienceError<E> {
    /// Whether the call was rejected without reaching the dependency
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    /// Return the wrapped operation error, if any
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Boxed error type used for type-erased work units
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for resilience operations
pub type ResilienceResult<T, E> = Result<T, ResilienceError<E>>;

/// Configuration result type using simple config errors
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Circuit is closed, allowing requests
    Closed,
    /// Circuit is open, rejecting requests
    Open,
    /// Circuit is half-open, probing whether the dependency recovered
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

//==============================================================================
// Configuration
//==============================================================================

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Horizon of the rolling error-rate window
    pub window_size: Duration,
    /// Minimum samples in the window before the breaker may trip; also the
    /// number of consecutive half-open successes needed to close
    pub volume_threshold: u64,
    /// Failure percentage (0-100] at which the breaker trips
    pub error_threshold_percentage: f64,
    /// Cooldown between opening and the first half-open probe
    pub reset_timeout: Duration,
    /// Deadline applied by [`CircuitBreaker::execute`]
    pub request_timeout: Duration,
    /// Optional minimum absolute failure count in the window before tripping
    pub failure_threshold: Option<u64>,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            window_size: Duration::from_secs(10),
            volume_threshold: 10,
            error_threshold_percentage: 50.0,
            reset_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            failure_threshold: None,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration builder
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.window_size.is_zero() {
            return Err(ConfigError::Invalid {
                message: "window_size must be greater than 0".to_string(),
            });
        }

        if self.volume_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "volume_threshold must be greater than 0".to_string(),
            });
        }

        if !(self.error_threshold_percentage > 0.0 && self.error_threshold_percentage <= 100.0) {
            return Err(ConfigError::Invalid {
                message: "error_threshold_percentage must be in (0, 100]".to_string(),
            });
        }

        if self.reset_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                message: "reset_timeout and request_timeout must be greater than 0".to_string(),
            });
        }

        if self.failure_threshold == Some(0) {
            return Err(ConfigError::Invalid {
                message: "failure_threshold must be greater than 0 when set".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for CircuitBreakerConfig
#[derive(Debug, Default)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    pub fn window_size(mut self, window: Duration) -> Self {
        self.config.window_size = window;
        self
    }

    pub fn volume_threshold(mut self, threshold: u64) -> Self {
        self.config.volume_threshold = threshold;
        self
    }

    pub fn error_threshold_percentage(mut self, percentage: f64) -> Self {
        self.config.error_threshold_percentage = percentage;
        self
    }

    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.config.reset_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn failure_threshold(mut self, threshold: u64) -> Self {
        self.config.failure_threshold = Some(threshold);
        self
    }

    /// Set a custom clock and build a breaker directly (useful for testing)
    pub fn clock<C: Clock>(self, clock: C) -> CircuitBreakerBuilderWithClock<C> {
        CircuitBreakerBuilderWithClock { config: self.config, clock }
    }

    pub fn build(self) -> ConfigResult<CircuitBreakerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Builder with custom clock that builds a CircuitBreaker directly
pub struct CircuitBreakerBuilderWithClock<C: Clock> {
    config: CircuitBreakerConfig,
    clock: C,
}

impl<C: Clock> CircuitBreakerBuilderWithClock<C> {
    pub fn build(self) -> ConfigResult<CircuitBreaker<C>> {
        CircuitBreaker::with_clock(self.config, self.clock)
    }
}

//==============================================================================
// Status
//==============================================================================

/// Read-only breaker snapshot
#[derive(Debug, Clone, Serialize)]
pub struct BreakerStatus {
    pub state: CircuitState,
    /// Failure percentage over the live window
    pub error_rate: f64,
    pub window_len: usize,
    pub window_failures: u64,
    pub consecutive_successes: u64,
    /// Milliseconds until the next probe is allowed; set only while open
    pub retry_after_ms: Option<u64>,
    pub total_calls: u64,
    pub rejected_calls: u64,
    pub total_failures: u64,
}

//==============================================================================
// Circuit Breaker
//==============================================================================

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_successes: u64,
    window: ErrorRateWindow,
    next_attempt: Option<Instant>,
    /// Bumped on every transition; outcomes of calls admitted in an earlier
    /// epoch are ignored
    epoch: u64,
}

/// Circuit breaker protecting one external dependency
///
/// Construct once and share behind an `Arc`. All transitions happen on the
/// [`execute`](Self::execute) path or through [`reset`](Self::reset).
pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
    total_calls: AtomicU64,
    rejected_calls: AtomicU64,
    total_failures: AtomicU64,
    clock: C,
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("total_calls", &self.total_calls.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker<SystemClock> {
    /// Create a new circuit breaker using the system clock
    pub fn new(config: CircuitBreakerConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Create a circuit breaker using the builder pattern
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// Create a new circuit breaker with a custom clock
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_successes: 0,
                window: ErrorRateWindow::new(config.window_size),
                next_attempt: None,
                epoch: 0,
            }),
            config,
            total_calls: AtomicU64::new(0),
            rejected_calls: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            clock,
        })
    }

    /// Breaker configuration
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state without triggering transitions
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Fast check whether a call would currently be attempted
    pub fn is_available(&self) -> bool {
        let inner = self.inner.lock();
        match inner.state {
            CircuitState::Open => inner.next_attempt.is_some_and(|at| self.clock.now() >= at),
            CircuitState::Closed | CircuitState::HalfOpen => true,
        }
    }

    /// Execute an operation under the configured `request_timeout`
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.execute_with_timeout(self.config.request_timeout, operation).await
    }

    /// Execute an operation with breaker protection and an explicit deadline
    ///
    /// A timeout counts as a failure. Losing the race drops the operation
    /// future, so the abandoned call cannot record an outcome later.
    #[instrument(skip(self, operation), fields(state = %self.state()))]
    pub async fn execute_with_timeout<F, Fut, T, E>(
        &self,
        timeout: Duration,
        operation: F,
    ) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let epoch = match self.acquire() {
            Ok(epoch) => epoch,
            Err(retry_after) => {
                self.rejected_calls.fetch_add(1, Ordering::Relaxed);
                debug!(retry_after_ms = retry_after.as_millis(), "circuit open, rejecting call");
                return Err(ResilienceError::CircuitOpen { retry_after });
            }
        };

        self.total_calls.fetch_add(1, Ordering::Relaxed);

        match tokio::time::timeout(timeout, operation()).await {
            Ok(Ok(value)) => {
                self.record(epoch, true);
                Ok(value)
            }
            Ok(Err(error)) => {
                self.record(epoch, false);
                warn!(error = %error, "protected operation failed");
                Err(ResilienceError::Failed(error))
            }
            Err(_) => {
                self.record(epoch, false);
                warn!(timeout_ms = timeout.as_millis(), "protected operation timed out");
                Err(ResilienceError::Timeout { timeout })
            }
        }
    }

    /// Admit a call, moving Open to HalfOpen once the cooldown elapsed.
    ///
    /// Returns the epoch the call was admitted in, or the remaining cooldown
    /// when the call must be rejected.
    fn acquire(&self) -> Result<u64, Duration> {
        let mut inner = self.inner.lock();
        if inner.state != CircuitState::Open {
            return Ok(inner.epoch);
        }

        let now = self.clock.now();
        let next_attempt = inner.next_attempt.unwrap_or(now);
        if now < next_attempt {
            return Err(next_attempt - now);
        }

        inner.state = CircuitState::HalfOpen;
        inner.consecutive_successes = 0;
        inner.window.clear();
        inner.next_attempt = None;
        inner.epoch += 1;
        info!("circuit breaker transitioning OPEN -> HALF_OPEN");
        Ok(inner.epoch)
    }

    fn record(&self, epoch: u64, success: bool) {
        if !success {
            self.total_failures.fetch_add(1, Ordering::Relaxed);
        }

        let now = self.clock.now();
        let mut inner = self.inner.lock();
        if epoch != inner.epoch {
            debug!(epoch, current = inner.epoch, success, "ignoring outcome from an earlier state");
            return;
        }

        match inner.state {
            CircuitState::Closed => {
                inner.window.prune(now);
                inner.window.record(now, success);
                if self.should_trip(&inner.window) {
                    warn!(
                        error_rate = inner.window.error_rate(),
                        samples = inner.window.len(),
                        "circuit breaker transitioning CLOSED -> OPEN"
                    );
                    self.open(&mut inner, now);
                }
            }
            CircuitState::HalfOpen => {
                if success {
                    inner.consecutive_successes += 1;
                    if inner.consecutive_successes >= self.config.volume_threshold {
                        inner.state = CircuitState::Closed;
                        inner.consecutive_successes = 0;
                        inner.window.clear();
                        inner.epoch += 1;
                        info!("circuit breaker transitioning HALF_OPEN -> CLOSED");
                    }
                } else {
                    warn!("probe failed, circuit breaker transitioning HALF_OPEN -> OPEN");
                    self.open(&mut inner, now);
                }
            }
            // Every call admitted before the trip carries an older epoch.
            CircuitState::Open => {}
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn should_trip(&self, window: &ErrorRateWindow) -> bool {
        window.len() as u64 >= self.config.volume_threshold
            && window.error_rate() >= self.config.error_threshold_percentage
            && self.config.failure_threshold.map_or(true, |min| window.failures() >= min)
    }

    fn open(&self, inner: &mut BreakerState, now: Instant) {
        inner.state = CircuitState::Open;
        inner.consecutive_successes = 0;
        inner.next_attempt = Some(now + self.config.reset_timeout);
        inner.epoch += 1;
    }

    /// Snapshot of state, live error rate and lifetime counters
    pub fn status(&self) -> BreakerStatus {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        inner.window.prune(now);

        let retry_after_ms = match inner.state {
            CircuitState::Open => inner.next_attempt.map(|at| {
                u64::try_from(at.saturating_duration_since(now).as_millis()).unwrap_or(u64::MAX)
            }),
            CircuitState::Closed | CircuitState::HalfOpen => None,
        };

        BreakerStatus {
            state: inner.state,
            error_rate: inner.window.error_rate(),
            window_len: inner.window.len(),
            window_failures: inner.window.failures(),
            consecutive_successes: inner.consecutive_successes,
            retry_after_ms,
            total_calls: self.total_calls.load(Ordering::Relaxed),
            rejected_calls: self.rejected_calls.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
        }
    }

    /// Force the breaker closed and clear every counter
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.consecutive_successes = 0;
        inner.window.clear();
        inner.next_attempt = None;
        inner.epoch += 1;
        drop(inner);

        self.total_calls.store(0, Ordering::Relaxed);
        self.rejected_calls.store(0, Ordering::Relaxed);
        self.total_failures.store(0, Ordering::Relaxed);
        info!("circuit breaker manually reset to CLOSED");
    }
}
