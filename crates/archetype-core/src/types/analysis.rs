//! Aggregated detection output: per-hypothesis scores, derived platform
//! features, reasoning trail, and advisory warnings.

use serde::{Deserialize, Serialize};

use crate::constants::HIGH_CONFIDENCE_THRESHOLD;
use crate::types::evidence::{Architecture, Evidence};

/// Normalized confidence score per architecture hypothesis.
///
/// After aggregation every score is in [0.0, 1.0]; the three values are
/// independent and do not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureScores {
    pub individual: f64,
    pub team: f64,
    pub hybrid: f64,
}

impl ArchitectureScores {
    pub fn new(individual: f64, team: f64, hybrid: f64) -> Self {
        Self {
            individual,
            team,
            hybrid,
        }
    }

    pub fn get(&self, architecture: Architecture) -> f64 {
        match architecture {
            Architecture::Individual => self.individual,
            Architecture::Team => self.team,
            Architecture::Hybrid => self.hybrid,
        }
    }

    fn set(&mut self, architecture: Architecture, value: f64) {
        match architecture {
            Architecture::Individual => self.individual = value,
            Architecture::Team => self.team = value,
            Architecture::Hybrid => self.hybrid = value,
        }
    }

    pub fn max_score(&self) -> f64 {
        self.individual.max(self.team).max(self.hybrid)
    }

    /// Rescale so no score exceeds 1.0. A no-op when already in range.
    pub fn normalize(&mut self) {
        let max = self.max_score();
        if max > 1.0 {
            for architecture in Architecture::ALL {
                self.set(architecture, self.get(architecture) / max);
            }
        }
    }

    /// Hypotheses ranked by score, highest first. Ties keep the
    /// [`Architecture::ALL`] declaration order (stable sort).
    pub fn ranked(&self) -> [(Architecture, f64); 3] {
        let mut ranked = Architecture::ALL.map(|a| (a, self.get(a)));
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// The winning hypothesis and its score.
    pub fn leader(&self) -> (Architecture, f64) {
        self.ranked()[0]
    }

    /// Gap between the leading and runner-up scores.
    pub fn separation(&self) -> f64 {
        let ranked = self.ranked();
        ranked[0].1 - ranked[1].1
    }
}

/// Coarse confidence label stored with a cache entry for quick filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
}

impl ConfidenceLevel {
    /// `High` at or above the high-confidence threshold, `Medium` below.
    pub fn from_confidence(overall_confidence: f64) -> Self {
        if overall_confidence >= HIGH_CONFIDENCE_THRESHOLD {
            Self::High
        } else {
            Self::Medium
        }
    }
}

/// A recognized application capability derived from the snapshot, such as
/// authentication or team collaboration. Derived alongside scoring, never
/// persisted on its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformFeature {
    /// Stable identifier, e.g. `"authentication"`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Coarse grouping, e.g. `"identity"` or `"collaboration"`.
    pub category: String,
    /// Whether the signature matched this snapshot.
    pub present: bool,
    /// How certain the match is (0.0-1.0).
    pub confidence: f64,
    /// Human-readable observations backing the match.
    pub evidence: Vec<String>,
    /// Tables that implement the feature.
    pub implementing_tables: Vec<String>,
    /// Hypotheses this feature typically appears under.
    pub typically_indicates: Vec<Architecture>,
    /// Application domains where the feature is common.
    pub common_in_domains: Vec<String>,
}

/// The full detection payload handed to downstream consumers and to the
/// result cache.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceAnalysisResult {
    /// Every evidence item that survived filtering, all kinds merged.
    pub evidence: Vec<Evidence>,
    /// Normalized per-hypothesis scores.
    pub architecture_scores: ArchitectureScores,
    /// Recognized capabilities, independent of the scores.
    pub platform_features: Vec<PlatformFeature>,
    /// Human-readable explanation of the classification, strongest first.
    pub reasoning: Vec<String>,
    /// Combined confidence in the whole classification (0.0-1.0).
    /// Computed once during aggregation; all consumers read this field.
    pub overall_confidence: f64,
    /// Advisory notes about evidence volume, ambiguity, or conflicts.
    pub warnings: Vec<String>,
}

impl EvidenceAnalysisResult {
    /// The winning hypothesis and its score.
    pub fn leading_architecture(&self) -> (Architecture, f64) {
        self.architecture_scores.leader()
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.overall_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rescales_when_above_one() {
        let mut scores = ArchitectureScores::new(2.0, 1.0, 0.5);
        scores.normalize();
        assert!((scores.individual - 1.0).abs() < 1e-10);
        assert!((scores.team - 0.5).abs() < 1e-10);
        assert!((scores.hybrid - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_normalize_noop_in_range() {
        let mut scores = ArchitectureScores::new(0.8, 0.3, 0.1);
        scores.normalize();
        assert!((scores.individual - 0.8).abs() < 1e-10);
    }

    #[test]
    fn test_ranked_orders_descending() {
        let scores = ArchitectureScores::new(0.2, 0.9, 0.5);
        let ranked = scores.ranked();
        assert_eq!(ranked[0].0, Architecture::Team);
        assert_eq!(ranked[1].0, Architecture::Hybrid);
        assert_eq!(ranked[2].0, Architecture::Individual);
    }

    #[test]
    fn test_ranked_tie_keeps_declaration_order() {
        let scores = ArchitectureScores::new(0.5, 0.5, 0.5);
        let ranked = scores.ranked();
        assert_eq!(ranked[0].0, Architecture::Individual);
        assert_eq!(ranked[1].0, Architecture::Team);
        assert_eq!(ranked[2].0, Architecture::Hybrid);
    }

    #[test]
    fn test_separation() {
        let scores = ArchitectureScores::new(0.9, 0.6, 0.1);
        assert!((scores.separation() - 0.3).abs() < 1e-10);
    }

    #[test]
    fn test_confidence_level_boundary() {
        assert_eq!(ConfidenceLevel::from_confidence(0.8), ConfidenceLevel::High);
        assert_eq!(
            ConfidenceLevel::from_confidence(0.79),
            ConfidenceLevel::Medium
        );
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let result = EvidenceAnalysisResult {
            architecture_scores: ArchitectureScores::new(0.7, 0.2, 0.3),
            overall_confidence: 0.65,
            reasoning: vec!["strong individual ownership signals".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_string(&result).expect("serialize result");
        let back: EvidenceAnalysisResult =
            serde_json::from_str(&json).expect("deserialize result");
        assert_eq!(back, result);
    }

    #[test]
    fn test_result_tolerates_unknown_fields() {
        let json = r#"{"overall_confidence": 0.5, "future_field": {"a": 1}}"#;
        let result: EvidenceAnalysisResult =
            serde_json::from_str(json).expect("deserialize with unknown fields");
        assert!((result.overall_confidence - 0.5).abs() < 1e-10);
        assert!(result.evidence.is_empty());
    }
}
