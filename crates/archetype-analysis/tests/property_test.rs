//! Property-based tests for detection invariants.
//!
//! Invariants that must hold for ANY snapshot, not just hand-crafted ones:
//! 1. Determinism: identical inputs yield identical results
//! 2. Normalization: no score ever exceeds 1.0
//! 3. Confidence floor: no kept evidence falls below the configured minimum
//! 4. Cap: evidence volume is bounded by the per-collector cap

use proptest::prelude::*;

use archetype_analysis::DetectionEngine;
use archetype_core::config::DetectionConfig;
use archetype_core::types::snapshot::{Relationship, SchemaSnapshot};

fn table_name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "users",
        "accounts",
        "profiles",
        "posts",
        "comments",
        "teams",
        "organizations",
        "team_members",
        "memberships",
        "projects",
        "documents",
        "invoices",
        "orders",
        "sessions",
        "roles",
    ])
    .prop_map(String::from)
}

fn column_name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "user_id",
        "account_id",
        "owner_id",
        "team_id",
        "org_id",
        "project_id",
        "parent_id",
    ])
    .prop_map(String::from)
}

fn snapshot_strategy() -> impl Strategy<Value = SchemaSnapshot> {
    (
        prop::collection::btree_set(table_name_strategy(), 0..10),
        prop::collection::vec(
            (
                table_name_strategy(),
                table_name_strategy(),
                column_name_strategy(),
            ),
            0..12,
        ),
    )
        .prop_map(|(tables, rels)| {
            let relationships = rels
                .into_iter()
                .map(|(from, to, column)| Relationship::new(from, to, column))
                .collect();
            SchemaSnapshot::new(tables, relationships)
        })
}

proptest! {
    #[test]
    fn prop_detection_is_deterministic(snapshot in snapshot_strategy()) {
        let engine = DetectionEngine::with_builtins();
        let config = DetectionConfig::default();
        let first = engine.collect_all(&snapshot, &config);
        let second = engine.collect_all(&snapshot, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_scores_and_confidence_stay_in_range(snapshot in snapshot_strategy()) {
        let engine = DetectionEngine::with_builtins();
        let result = engine.collect_all(&snapshot, &DetectionConfig::default());
        prop_assert!(result.architecture_scores.max_score() <= 1.0 + 1e-9);
        prop_assert!(result.architecture_scores.individual >= 0.0);
        prop_assert!(result.architecture_scores.team >= 0.0);
        prop_assert!(result.architecture_scores.hybrid >= 0.0);
        prop_assert!((0.0..=1.0).contains(&result.overall_confidence));
    }

    #[test]
    fn prop_kept_evidence_respects_confidence_floor(
        snapshot in snapshot_strategy(),
        floor in 0.0f64..=1.0,
    ) {
        let engine = DetectionEngine::with_builtins();
        let config = DetectionConfig {
            min_evidence_confidence: Some(floor),
            ..Default::default()
        };
        let result = engine.collect_all(&snapshot, &config);
        for item in &result.evidence {
            prop_assert!(
                item.confidence >= floor,
                "item below floor {}: {:?}", floor, item.description
            );
        }
    }

    #[test]
    fn prop_evidence_volume_bounded_by_cap(
        snapshot in snapshot_strategy(),
        cap in 1usize..5,
    ) {
        let engine = DetectionEngine::with_builtins();
        let config = DetectionConfig {
            max_evidence_per_type: Some(cap),
            min_evidence_confidence: Some(0.0),
            ..Default::default()
        };
        let result = engine.collect_all(&snapshot, &config);
        prop_assert!(result.evidence.len() <= cap * engine.pack_count());
    }
}
