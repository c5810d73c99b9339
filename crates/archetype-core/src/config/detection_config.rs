//! Evidence collection configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_EVIDENCE_PER_TYPE, DEFAULT_MIN_EVIDENCE_CONFIDENCE};

/// Knobs governing which collected evidence is kept and how much detail it
/// carries. These filter and rank evidence; they never change how a signal
/// is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DetectionConfig {
    /// Attach per-table supporting detail to table evidence. Default: true.
    pub detailed_table_analysis: Option<bool>,
    /// Keep column-analysis evidence. Default: true.
    pub analyze_column_patterns: Option<bool>,
    /// Keep relationship-pattern evidence. Default: true.
    pub analyze_relationships: Option<bool>,
    /// Run rules gated behind the business-logic flag. Default: false.
    /// No builtin rule uses the gate; custom packs may.
    pub analyze_business_logic: Option<bool>,
    /// Maximum evidence items kept per evidence kind. Default: 10, floor 1.
    pub max_evidence_per_type: Option<usize>,
    /// Minimum confidence for an item to be kept at all. Default: 0.3.
    pub min_evidence_confidence: Option<f64>,
}

impl DetectionConfig {
    pub fn effective_detailed_table_analysis(&self) -> bool {
        self.detailed_table_analysis.unwrap_or(true)
    }

    pub fn effective_analyze_column_patterns(&self) -> bool {
        self.analyze_column_patterns.unwrap_or(true)
    }

    pub fn effective_analyze_relationships(&self) -> bool {
        self.analyze_relationships.unwrap_or(true)
    }

    pub fn effective_analyze_business_logic(&self) -> bool {
        self.analyze_business_logic.unwrap_or(false)
    }

    /// Effective per-kind cap. Never below 1.
    pub fn effective_max_evidence_per_type(&self) -> usize {
        self.max_evidence_per_type
            .unwrap_or(DEFAULT_MAX_EVIDENCE_PER_TYPE)
            .max(1)
    }

    /// Effective confidence floor, clamped to [0.0, 1.0].
    pub fn effective_min_evidence_confidence(&self) -> f64 {
        self.min_evidence_confidence
            .unwrap_or(DEFAULT_MIN_EVIDENCE_CONFIDENCE)
            .clamp(0.0, 1.0)
    }
}
