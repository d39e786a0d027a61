//! Configuration loading and management
//!
//! This module loads application configuration from files and environment
//! variables, and maps the loaded settings onto component configurations.

pub mod components;
pub mod loader;

// Re-export commonly used items
pub use components::{breaker_config, cache_config, queue_config};
pub use loader::{apply_env_overrides, load, load_from_env, load_from_file, probe_config_paths};
