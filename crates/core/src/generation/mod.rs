//! Request admission in front of the item generator
//!
//! estimate difficulty → exact cache → item bank → job queue (breaker
//! protected) → write back to cache and bank.

pub mod pipeline;
pub mod ports;

pub use pipeline::{
    cache_key, AdmissionPipeline, BankedItem, GenerationOutcome, GenerationQueue, HealthReport,
    ItemCache, Source,
};
