//! # archetype-core
//!
//! Foundation crate for the Archetype platform-architecture detection engine.
//! Defines the shared types, config, errors, tracing, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::{CacheConfig, DetectionConfig, InvalidationStrategy};
pub use errors::error_code::ArchetypeErrorCode;
pub use types::analysis::{
    ArchitectureScores, ConfidenceLevel, EvidenceAnalysisResult, PlatformFeature,
};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::evidence::{
    Architecture, ArchitectureIndicators, Evidence, EvidenceKind, SupportingData,
};
pub use types::snapshot::{Relationship, SchemaSnapshot};
