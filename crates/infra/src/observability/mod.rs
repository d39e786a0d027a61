//! Tracing subscriber setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and one fmt
//! layer, human-readable or JSON lines. `RUST_LOG` takes precedence over the
//! configured level when set.

use quizgate_domain::{LoggingSettings, QuizgateError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter for the configured level
///
/// # Errors
/// Returns `QuizgateError::Config` if the directive does not parse.
pub fn env_filter(settings: &LoggingSettings) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.level).map_err(|e| {
        QuizgateError::Config(format!("Invalid log level {:?}: {e}", settings.level))
    })
}

/// Install the global subscriber
///
/// Returns `false` when a global subscriber was already installed, which is
/// left in place.
///
/// # Errors
/// Returns `QuizgateError::Config` for an invalid level directive.
pub fn init_tracing(settings: &LoggingSettings) -> Result<bool> {
    let filter = env_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if settings.json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init()
            .is_ok()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init().is_ok()
    };

    if installed {
        tracing::info!(level = %settings.level, json = settings.json, "tracing initialized");
    } else {
        tracing::debug!("global tracing subscriber already installed, keeping it");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let settings = LoggingSettings { level: "info,quizgate=notalevel".to_string(), json: false };
        assert!(matches!(env_filter(&settings), Err(QuizgateError::Config(_))));
    }

    /// Validates a second install keeps the first subscriber.
    ///
    /// Assertions:
    /// - Ensures the second call reports nothing was installed.
    /// - Confirms neither call errors.
    #[test]
    fn test_second_init_is_noop() {
        let settings = LoggingSettings::default();
        let first = init_tracing(&settings).expect("first init");
        let second = init_tracing(&LoggingSettings { json: true, ..settings }).expect("second init");
        assert!(!second, "first install reported {first}");
    }
}
