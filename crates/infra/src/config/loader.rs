//! Configuration loader
//!
//! Loads application configuration from files and environment variables.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment, if one exists
//! 2. Probes multiple paths for a config file (JSON or TOML); with none
//!    found, every setting keeps its default
//! 3. Applies `QUIZGATE_*` environment overrides on top
//! 4. Validates the result
//!
//! ## Environment Variables
//! - `QUIZGATE_CONFIG`: Explicit config file path, checked before probing
//! - `QUIZGATE_QUEUE_MAX_CONCURRENT`, `QUIZGATE_QUEUE_INTER_REQUEST_DELAY_MS`,
//!   `QUIZGATE_QUEUE_MAX_QUEUE_SIZE`, `QUIZGATE_QUEUE_TIMEOUT_MS`,
//!   `QUIZGATE_QUEUE_MAX_RETRIES`, `QUIZGATE_QUEUE_RETRY_BASE_DELAY_MS`,
//!   `QUIZGATE_QUEUE_RETRY_POSITION` (`tail` or `head`)
//! - `QUIZGATE_BREAKER_WINDOW_SIZE_MS`, `QUIZGATE_BREAKER_VOLUME_THRESHOLD`,
//!   `QUIZGATE_BREAKER_ERROR_THRESHOLD_PERCENTAGE`,
//!   `QUIZGATE_BREAKER_RESET_TIMEOUT_MS`, `QUIZGATE_BREAKER_REQUEST_TIMEOUT_MS`,
//!   `QUIZGATE_BREAKER_FAILURE_THRESHOLD`
//! - `QUIZGATE_CACHE_TTL_MS`, `QUIZGATE_CACHE_MAX_ENTRIES`,
//!   `QUIZGATE_CACHE_BANK_CAPACITY`, `QUIZGATE_CACHE_SWEEP_INTERVAL_MS`,
//!   `QUIZGATE_CACHE_BANK_MIN_QUALITY`
//! - `QUIZGATE_ESTIMATOR_HISTORY_LIMIT`, `QUIZGATE_ESTIMATOR_SLOW_ITEM_SECS`,
//!   `QUIZGATE_ESTIMATOR_TOPIC_ACCURACY_FLOOR`
//! - `QUIZGATE_LOG_LEVEL`, `QUIZGATE_LOG_JSON` (true/false)
//!
//! ## File Locations
//! The loader probes the following names in each directory:
//! `quizgate.toml`, `quizgate.json`, `config.toml`, `config.json`.
//! Directories are searched in order:
//! 1. Current working directory
//! 2. Parent directory, then grandparent directory
//! 3. Directory of the executable and its two parents

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use quizgate_domain::{Config, QuizgateError, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "QUIZGATE_CONFIG";

const CONFIG_FILE_NAMES: [&str; 4] = ["quizgate.toml", "quizgate.json", "config.toml", "config.json"];

/// Load configuration with the full layering strategy
///
/// # Errors
/// Returns `QuizgateError::Config` if:
/// - A config file exists but cannot be read or parsed
/// - An override variable holds an unparsable value
/// - The merged configuration fails validation
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(QuizgateError::Config(format!("Failed to read .env file: {e}"))),
    }

    let mut config = match probe_config_paths() {
        Some(path) => read_config_file(&path)?,
        None => {
            tracing::info!("No config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from defaults plus environment overrides only
///
/// # Errors
/// Returns `QuizgateError::Config` if an override is unparsable or the
/// result fails validation.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Environment overrides are not applied.
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `QuizgateError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(QuizgateError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            QuizgateError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    let config = read_config_file(&config_path)?;
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| QuizgateError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`); missing
/// sections and fields keep their defaults.
///
/// # Errors
/// Returns `QuizgateError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| QuizgateError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| QuizgateError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(QuizgateError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// `QUIZGATE_CONFIG` wins when it names an existing file. Otherwise the
/// current working directory, its two parents, then the executable's
/// directory and its two parents are searched.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        let explicit = PathBuf::from(explicit);
        if explicit.exists() {
            return Some(explicit);
        }
        tracing::warn!(path = %explicit.display(), "{CONFIG_PATH_ENV} points at a missing file");
    }

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend(exe_dir.ancestors().take(3).map(Path::to_path_buf));
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Apply `QUIZGATE_*` overrides to a loaded configuration
///
/// Unset variables leave the current value in place.
///
/// # Errors
/// Returns `QuizgateError::Config` naming the first unparsable variable.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    let queue = &mut config.queue;
    override_with(&mut queue.max_concurrent, "QUIZGATE_QUEUE_MAX_CONCURRENT")?;
    override_with(&mut queue.inter_request_delay_ms, "QUIZGATE_QUEUE_INTER_REQUEST_DELAY_MS")?;
    override_with(&mut queue.max_queue_size, "QUIZGATE_QUEUE_MAX_QUEUE_SIZE")?;
    override_with(&mut queue.timeout_ms, "QUIZGATE_QUEUE_TIMEOUT_MS")?;
    override_with(&mut queue.max_retries, "QUIZGATE_QUEUE_MAX_RETRIES")?;
    override_with(&mut queue.retry_base_delay_ms, "QUIZGATE_QUEUE_RETRY_BASE_DELAY_MS")?;
    override_with(&mut queue.retry_position, "QUIZGATE_QUEUE_RETRY_POSITION")?;

    let breaker = &mut config.breaker;
    override_with(&mut breaker.window_size_ms, "QUIZGATE_BREAKER_WINDOW_SIZE_MS")?;
    override_with(&mut breaker.volume_threshold, "QUIZGATE_BREAKER_VOLUME_THRESHOLD")?;
    override_with(
        &mut breaker.error_threshold_percentage,
        "QUIZGATE_BREAKER_ERROR_THRESHOLD_PERCENTAGE",
    )?;
    override_with(&mut breaker.reset_timeout_ms, "QUIZGATE_BREAKER_RESET_TIMEOUT_MS")?;
    override_with(&mut breaker.request_timeout_ms, "QUIZGATE_BREAKER_REQUEST_TIMEOUT_MS")?;
    if let Some(threshold) = env_parse("QUIZGATE_BREAKER_FAILURE_THRESHOLD")? {
        breaker.failure_threshold = Some(threshold);
    }

    let cache = &mut config.cache;
    override_with(&mut cache.ttl_ms, "QUIZGATE_CACHE_TTL_MS")?;
    override_with(&mut cache.max_entries, "QUIZGATE_CACHE_MAX_ENTRIES")?;
    override_with(&mut cache.bank_capacity, "QUIZGATE_CACHE_BANK_CAPACITY")?;
    override_with(&mut cache.sweep_interval_ms, "QUIZGATE_CACHE_SWEEP_INTERVAL_MS")?;
    override_with(&mut cache.bank_min_quality, "QUIZGATE_CACHE_BANK_MIN_QUALITY")?;

    let estimator = &mut config.estimator;
    override_with(&mut estimator.history_limit, "QUIZGATE_ESTIMATOR_HISTORY_LIMIT")?;
    override_with(&mut estimator.slow_item_secs, "QUIZGATE_ESTIMATOR_SLOW_ITEM_SECS")?;
    override_with(&mut estimator.topic_accuracy_floor, "QUIZGATE_ESTIMATOR_TOPIC_ACCURACY_FLOOR")?;

    if let Ok(level) = std::env::var("QUIZGATE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("QUIZGATE_LOG_JSON", config.logging.json);

    Ok(())
}

fn override_with<T>(field: &mut T, key: &str) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(value) = env_parse(key)? {
        *field = value;
    }
    Ok(())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `QuizgateError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| QuizgateError::Config(format!("Invalid value for {key} ({raw:?}): {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
