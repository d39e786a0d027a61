//! # Quizgate Infrastructure
//!
//! Process-level wiring for the admission layer.
//!
//! This crate contains:
//! - Configuration loading (files, `.env`, `QUIZGATE_*` overrides)
//! - Mapping of loaded settings onto component configurations
//! - Tracing subscriber setup
//! - The [`AppContext`] that builds and shares every component
//!
//! ## Architecture
//! - Depends on `quizgate-common`, `quizgate-domain` and `quizgate-core`
//! - History storage and item generation stay behind the core port traits;
//!   the embedding application supplies them

pub mod config;
pub mod context;
pub mod errors;
pub mod observability;

// Re-export commonly used items
pub use context::AppContext;
pub use errors::InfraError;
pub use observability::init_tracing;
