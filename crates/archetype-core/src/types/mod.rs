//! Data structures for the detection engine.
//! Schema snapshots, evidence items, and aggregated analysis results.

pub mod analysis;
pub mod collections;
pub mod evidence;
pub mod snapshot;

pub use analysis::{ArchitectureScores, ConfidenceLevel, EvidenceAnalysisResult, PlatformFeature};
pub use collections::{FxHashMap, FxHashSet};
pub use evidence::{Architecture, ArchitectureIndicators, Evidence, EvidenceKind, SupportingData};
pub use snapshot::{Relationship, SchemaSnapshot};
