//! Resilience patterns for protecting a slow or failing dependency
//!
//! - **Circuit Breaker**: stops calling a dependency whose recent error rate
//!   crossed a threshold, then probes it again after a cooldown
//! - **Error-rate window**: the time-bounded outcome history the breaker
//!   decides on
//! - **Clock**: time abstraction so cooldowns can be tested without sleeping
//!
//! The breaker is generic over the wrapped operation's error type; the job
//! queue runs every attempt through it with a per-item deadline.

pub mod circuit_breaker;
pub mod clock;
pub mod window;

pub use circuit_breaker::{
    BoxedError, BreakerStatus, CircuitBreaker, CircuitBreakerBuilderWithClock,
    CircuitBreakerConfig, CircuitBreakerConfigBuilder, CircuitState, ConfigError, ConfigResult,
    ResilienceError, ResilienceResult,
};
pub use clock::{Clock, MockClock, SystemClock};
pub use window::ErrorRateWindow;
