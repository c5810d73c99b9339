//! Evidence aggregation and architecture classification.
//!
//! Runs every rule pack against the snapshot, merges the evidence, and
//! derives scores, platform features, a reasoning trail, an overall
//! confidence, and advisory warnings. Aggregation never fails for a
//! well-formed snapshot: thin evidence degrades to low scores and warnings,
//! not errors.

use std::cmp::Ordering;
use std::path::Path;

use rayon::prelude::*;

use archetype_core::config::DetectionConfig;
use archetype_core::constants::{
    CONFIDENCE_VOLUME_SATURATION, CONFIDENCE_WEIGHT_MEAN, CONFIDENCE_WEIGHT_SEPARATION,
    CONFIDENCE_WEIGHT_VOLUME, REASONING_TOP_EVIDENCE, WARN_CONFLICT_INDICATOR,
    WARN_CONFLICT_MARGIN, WARN_CONFLICT_STRENGTH, WARN_LOW_CONFIDENCE, WARN_MIN_EVIDENCE_COUNT,
    WARN_SCORE_SEPARATION,
};
use archetype_core::types::analysis::{ArchitectureScores, EvidenceAnalysisResult};
use archetype_core::types::evidence::{Architecture, ArchitectureIndicators, Evidence};
use archetype_core::types::snapshot::SchemaSnapshot;

use crate::collector::collect_pack;
use crate::features::FeatureCatalog;
use crate::rules::{CompiledRulePack, RuleDiagnostics, RulePackRegistry};

/// The detection engine: compiled rule packs plus the feature catalog.
///
/// Build once, reuse across snapshots. Detection holds no mutable state, so
/// a shared reference is enough for concurrent callers.
pub struct DetectionEngine {
    packs: Vec<CompiledRulePack>,
    catalog: FeatureCatalog,
    diagnostics: RuleDiagnostics,
}

impl DetectionEngine {
    /// Engine with the three builtin packs only.
    pub fn with_builtins() -> Self {
        Self::new(RulePackRegistry::with_builtins())
    }

    /// Engine with builtin packs plus custom packs from a directory.
    pub fn with_custom_packs(custom_dir: &Path) -> Self {
        Self::new(RulePackRegistry::with_builtins_and_custom(custom_dir))
    }

    pub fn new(registry: RulePackRegistry) -> Self {
        let diagnostics = registry.diagnostics().clone();
        tracing::debug!("{}", diagnostics.summary());
        Self {
            packs: registry.into_packs(),
            catalog: FeatureCatalog::builtin(),
            diagnostics,
        }
    }

    pub fn pack_count(&self) -> usize {
        self.packs.len()
    }

    pub fn diagnostics(&self) -> &RuleDiagnostics {
        &self.diagnostics
    }

    /// Run every pack against the snapshot and aggregate the evidence into
    /// a full analysis result.
    ///
    /// Packs are evaluated in parallel; they share only read access to the
    /// snapshot and the merged evidence list keeps pack load order, so the
    /// output is deterministic for a given snapshot and config.
    pub fn collect_all(
        &self,
        snapshot: &SchemaSnapshot,
        config: &DetectionConfig,
    ) -> EvidenceAnalysisResult {
        let per_pack: Vec<Vec<Evidence>> = self
            .packs
            .par_iter()
            .map(|pack| collect_pack(pack, snapshot, config))
            .collect();
        let evidence: Vec<Evidence> = per_pack.into_iter().flatten().collect();

        let architecture_scores = compute_scores(&evidence);
        let platform_features = self.catalog.extract(snapshot);
        let reasoning = build_reasoning(&evidence, &architecture_scores);
        // Computed exactly once; every consumer reads the stored field.
        let overall_confidence = compute_overall_confidence(&evidence, &architecture_scores);
        let warnings = build_warnings(&evidence, &architecture_scores, overall_confidence);

        let (leader, leader_score) = architecture_scores.leader();
        tracing::debug!(
            evidence_count = evidence.len(),
            leader = %leader,
            leader_score,
            overall_confidence,
            warning_count = warnings.len(),
            "schema detection complete"
        );

        EvidenceAnalysisResult {
            evidence,
            architecture_scores,
            platform_features,
            reasoning,
            overall_confidence,
            warnings,
        }
    }
}

/// Weighted average of indicators, weighted by `confidence * weight`.
///
/// Items with non-finite confidence, weight, or indicators are excluded so
/// one poisoned value cannot turn every score into NaN. Zero usable evidence
/// yields all-zero scores, never a division by zero.
fn compute_scores(evidence: &[Evidence]) -> ArchitectureScores {
    let valid: Vec<&Evidence> = evidence
        .iter()
        .filter(|e| e.strength().is_finite() && e.strength() > 0.0)
        .filter(|e| {
            Architecture::ALL
                .iter()
                .all(|a| e.indicators.get(*a).is_finite())
        })
        .collect();
    if valid.is_empty() {
        return ArchitectureScores::default();
    }

    let total_weight: f64 = valid.iter().map(|e| e.strength()).sum();
    if total_weight <= 0.0 {
        return ArchitectureScores::default();
    }

    let mut sums = [0.0f64; 3];
    for item in &valid {
        let strength = item.strength();
        for (slot, architecture) in sums.iter_mut().zip(Architecture::ALL) {
            *slot += item.indicators.get(architecture) * strength;
        }
    }

    let mut scores = ArchitectureScores::new(
        sums[0] / total_weight,
        sums[1] / total_weight,
        sums[2] / total_weight,
    );
    scores.normalize();
    scores
}

/// Top evidence items rendered one per line, strongest first, then a final
/// line with the three scores.
fn build_reasoning(evidence: &[Evidence], scores: &ArchitectureScores) -> Vec<String> {
    let mut ranked: Vec<&Evidence> = evidence.iter().collect();
    ranked.sort_by(|a, b| {
        b.strength()
            .partial_cmp(&a.strength())
            .unwrap_or(Ordering::Equal)
    });

    let mut lines = Vec::with_capacity(REASONING_TOP_EVIDENCE + 1);
    for item in ranked.iter().take(REASONING_TOP_EVIDENCE) {
        let (favored, _) = item.indicators.dominant();
        lines.push(format!(
            "{} -> favors {} (strength {:.2})",
            item.description,
            favored,
            item.strength()
        ));
    }
    lines.push(format!(
        "Scores: individual {:.2}, team {:.2}, hybrid {:.2}",
        scores.individual, scores.team, scores.hybrid
    ));
    lines
}

/// Blend of mean evidence confidence, evidence volume, and score separation.
/// Zero evidence pins the result to 0.0.
fn compute_overall_confidence(evidence: &[Evidence], scores: &ArchitectureScores) -> f64 {
    if evidence.is_empty() {
        return 0.0;
    }

    let finite: Vec<f64> = evidence
        .iter()
        .map(|e| e.confidence)
        .filter(|c| c.is_finite())
        .collect();
    let mean_confidence = if finite.is_empty() {
        0.0
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    };
    let volume = (evidence.len() as f64 / CONFIDENCE_VOLUME_SATURATION).min(1.0);
    let separation = scores.separation();

    (CONFIDENCE_WEIGHT_MEAN * mean_confidence
        + CONFIDENCE_WEIGHT_VOLUME * volume
        + CONFIDENCE_WEIGHT_SEPARATION * separation)
        .clamp(0.0, 1.0)
}

/// Advisory warnings about evidence volume, internal conflicts, ambiguity,
/// and low confidence. Never fatal.
fn build_warnings(
    evidence: &[Evidence],
    scores: &ArchitectureScores,
    overall_confidence: f64,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if evidence.len() < WARN_MIN_EVIDENCE_COUNT {
        warnings.push(format!(
            "Insufficient evidence: only {} item(s) collected, classification may be unreliable",
            evidence.len()
        ));
    }

    let conflicted = evidence
        .iter()
        .filter(|e| e.strength() > WARN_CONFLICT_STRENGTH)
        .filter(|e| e.indicators.supported_above(WARN_CONFLICT_INDICATOR) > 1)
        .filter(|e| indicator_margin(&e.indicators) < WARN_CONFLICT_MARGIN)
        .count();
    if conflicted > 0 {
        warnings.push(format!(
            "{conflicted} strong evidence item(s) support multiple hypotheses without a clear leader"
        ));
    }

    // Skipped for all-zero scores: the insufficient-evidence warning already
    // covers the empty case.
    if scores.max_score() > 0.0 && scores.separation() < WARN_SCORE_SEPARATION {
        let ranked = scores.ranked();
        warnings.push(format!(
            "Ambiguous classification: {} and {} scores differ by only {:.2}",
            ranked[0].0,
            ranked[1].0,
            scores.separation()
        ));
    }

    if overall_confidence < WARN_LOW_CONFIDENCE {
        warnings.push(format!(
            "Overall confidence {:.2} is below the reliable threshold {:.2}",
            overall_confidence, WARN_LOW_CONFIDENCE
        ));
    }

    warnings
}

/// Gap between an item's top two indicator values.
fn indicator_margin(indicators: &ArchitectureIndicators) -> f64 {
    let mut values = Architecture::ALL.map(|a| indicators.get(a));
    values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    values[0] - values[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use archetype_core::types::evidence::{EvidenceKind, SupportingData};

    fn make_item(confidence: f64, weight: f64, indicators: ArchitectureIndicators) -> Evidence {
        Evidence::new(
            EvidenceKind::TablePattern,
            "test item",
            confidence,
            weight,
            SupportingData::default(),
            indicators,
        )
    }

    #[test]
    fn test_scores_are_strength_weighted_averages() {
        let evidence = vec![
            make_item(1.0, 1.0, ArchitectureIndicators::new(0.8, 0.2, 0.0)),
            make_item(0.5, 1.0, ArchitectureIndicators::new(0.2, 0.8, 0.0)),
        ];
        let scores = compute_scores(&evidence);
        // individual: (0.8*1.0 + 0.2*0.5) / 1.5 = 0.6
        // team:       (0.2*1.0 + 0.8*0.5) / 1.5 = 0.4
        assert!((scores.individual - 0.6).abs() < 1e-10);
        assert!((scores.team - 0.4).abs() < 1e-10);
        assert!(scores.hybrid.abs() < 1e-10);
    }

    #[test]
    fn test_zero_evidence_scores_all_zero() {
        let scores = compute_scores(&[]);
        assert_eq!(scores, ArchitectureScores::default());
    }

    #[test]
    fn test_non_finite_items_are_excluded() {
        let evidence = vec![
            make_item(f64::NAN, 1.0, ArchitectureIndicators::new(1.0, 1.0, 1.0)),
            make_item(0.8, 0.5, ArchitectureIndicators::new(0.5, 0.1, 0.1)),
        ];
        let scores = compute_scores(&evidence);
        assert!((scores.individual - 0.5).abs() < 1e-10);
        assert!(scores.individual.is_finite());
    }

    #[test]
    fn test_scores_normalized_when_indicators_exceed_one() {
        // Custom packs may declare indicators above 1.0; serde does not
        // clamp them.
        let oversized = ArchitectureIndicators {
            individual: 1.8,
            team: 0.9,
            hybrid: 0.3,
        };
        let evidence = vec![make_item(1.0, 1.0, oversized)];
        let scores = compute_scores(&evidence);
        assert!((scores.individual - 1.0).abs() < 1e-10);
        assert!((scores.team - 0.5).abs() < 1e-10);
        assert!(scores.max_score() <= 1.0);
    }

    #[test]
    fn test_overall_confidence_hand_computed() {
        let evidence = vec![
            make_item(0.9, 1.0, ArchitectureIndicators::new(0.8, 0.1, 0.1)),
            make_item(0.7, 1.0, ArchitectureIndicators::new(0.9, 0.0, 0.2)),
        ];
        let scores = compute_scores(&evidence);
        let overall = compute_overall_confidence(&evidence, &scores);
        let expected = 0.4 * 0.8 + 0.3 * 0.2 + 0.3 * scores.separation();
        assert!((overall - expected).abs() < 1e-10);
    }

    #[test]
    fn test_overall_confidence_zero_for_no_evidence() {
        let overall = compute_overall_confidence(&[], &ArchitectureScores::default());
        assert_eq!(overall, 0.0);
    }

    #[test]
    fn test_volume_term_saturates_at_ten_items() {
        let item = make_item(0.5, 1.0, ArchitectureIndicators::new(1.0, 0.0, 0.0));
        let ten: Vec<Evidence> = (0..10).map(|_| item.clone()).collect();
        let twenty: Vec<Evidence> = (0..20).map(|_| item.clone()).collect();
        let scores = compute_scores(&ten);
        let at_ten = compute_overall_confidence(&ten, &scores);
        let at_twenty = compute_overall_confidence(&twenty, &scores);
        assert!((at_ten - at_twenty).abs() < 1e-10);
    }

    #[test]
    fn test_reasoning_caps_at_top_five_plus_scores_line() {
        let evidence: Vec<Evidence> = (0..8)
            .map(|i| {
                make_item(
                    0.5 + 0.05 * i as f64,
                    0.8,
                    ArchitectureIndicators::new(0.8, 0.1, 0.1),
                )
            })
            .collect();
        let scores = compute_scores(&evidence);
        let reasoning = build_reasoning(&evidence, &scores);
        assert_eq!(reasoning.len(), REASONING_TOP_EVIDENCE + 1);
        assert!(
            reasoning.last().unwrap().starts_with("Scores:"),
            "final line carries the scores, got {:?}",
            reasoning.last()
        );
        // Strongest item first.
        assert!(reasoning[0].contains("strength 0.68"));
    }

    #[test]
    fn test_reasoning_names_dominant_hypothesis() {
        let evidence = vec![make_item(
            0.9,
            0.9,
            ArchitectureIndicators::new(0.1, 0.9, 0.2),
        )];
        let scores = compute_scores(&evidence);
        let reasoning = build_reasoning(&evidence, &scores);
        assert!(reasoning[0].contains("favors team"));
    }

    #[test]
    fn test_warning_on_thin_evidence() {
        let evidence = vec![make_item(
            0.9,
            0.9,
            ArchitectureIndicators::new(0.9, 0.0, 0.1),
        )];
        let scores = compute_scores(&evidence);
        let warnings = build_warnings(&evidence, &scores, 0.9);
        assert!(warnings.iter().any(|w| w.contains("Insufficient evidence")));
    }

    #[test]
    fn test_warning_on_conflicting_indicators() {
        let evidence = vec![make_item(
            0.9,
            0.9,
            ArchitectureIndicators::new(0.6, 0.55, 0.1),
        )];
        let scores = compute_scores(&evidence);
        let warnings = build_warnings(&evidence, &scores, 0.9);
        assert!(warnings
            .iter()
            .any(|w| w.contains("support multiple hypotheses")));
    }

    #[test]
    fn test_no_conflict_warning_when_one_indicator_dominates() {
        let evidence = vec![make_item(
            0.9,
            0.9,
            ArchitectureIndicators::new(0.9, 0.45, 0.1),
        )];
        let scores = compute_scores(&evidence);
        let warnings = build_warnings(&evidence, &scores, 0.9);
        assert!(!warnings
            .iter()
            .any(|w| w.contains("support multiple hypotheses")));
    }

    #[test]
    fn test_warning_on_ambiguous_scores() {
        let scores = ArchitectureScores::new(0.55, 0.5, 0.1);
        let warnings = build_warnings(&[], &scores, 0.9);
        assert!(warnings.iter().any(|w| w.contains("Ambiguous")));
    }

    #[test]
    fn test_warning_on_low_overall_confidence() {
        let scores = ArchitectureScores::new(0.9, 0.2, 0.1);
        let warnings = build_warnings(&[], &scores, 0.4);
        assert!(warnings.iter().any(|w| w.contains("below the reliable")));
    }

    #[test]
    fn test_engine_with_builtins_has_three_packs() {
        let engine = DetectionEngine::with_builtins();
        assert_eq!(engine.pack_count(), 3);
        assert_eq!(engine.diagnostics().builtin_packs_loaded, 3);
    }

    #[test]
    fn test_empty_snapshot_degrades_cleanly() {
        let engine = DetectionEngine::with_builtins();
        let result = engine.collect_all(&SchemaSnapshot::empty(), &DetectionConfig::default());
        assert!(result.evidence.is_empty());
        assert_eq!(result.architecture_scores, ArchitectureScores::default());
        assert_eq!(result.overall_confidence, 0.0);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("Insufficient evidence")));
    }
}
