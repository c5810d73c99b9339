//! # archetype-analysis
//!
//! Detection engine for the Archetype schema classifier.
//! Contains the declarative rule packs, the evidence collector, the
//! platform feature catalog, and the aggregating detection engine.

pub mod aggregator;
pub mod collector;
pub mod features;
pub mod rules;

pub use aggregator::DetectionEngine;
pub use features::FeatureCatalog;
pub use rules::{PackConfig, RulePackRegistry};
