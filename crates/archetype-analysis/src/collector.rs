//! Rule-driven evidence collection over a schema snapshot.
//!
//! One generic evaluator serves every hypothesis pack; packs differ only in
//! their rule data. Each rule emits zero or one evidence item. The collected
//! list is filtered by the configured confidence floor, ranked by strength
//! (stable, so equal-strength items keep rule declaration order), and
//! truncated to the per-collector cap.

use std::cmp::Ordering;

use regex::Regex;

use archetype_core::config::DetectionConfig;
use archetype_core::types::evidence::{Evidence, EvidenceKind, SupportingData};
use archetype_core::types::snapshot::SchemaSnapshot;

use crate::rules::loader::{CompiledRule, CompiledRulePack, RuleMatcher};
use crate::rules::types::ConfigGate;

/// Evaluate every rule in a pack against the snapshot.
///
/// Pure with respect to the snapshot: no I/O, deterministic for a fixed
/// snapshot and config. A snapshot with no matching rules yields an empty
/// list, never an error.
pub fn collect_pack(
    pack: &CompiledRulePack,
    snapshot: &SchemaSnapshot,
    config: &DetectionConfig,
) -> Vec<Evidence> {
    // An empty snapshot carries no signal; absence rules must not fire
    // on a schema with nothing in it.
    if snapshot.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    for rule in &pack.rules {
        if !rule_enabled(rule, config) {
            tracing::debug!(
                rule = %rule.id,
                pack = %pack.name,
                "Rule disabled by collection config, skipping"
            );
            continue;
        }
        if let Some(evidence) = evaluate_rule(rule, snapshot, config) {
            items.push(evidence);
        }
    }

    let min_confidence = config.effective_min_evidence_confidence();
    items.retain(|e| e.confidence >= min_confidence);
    items.sort_by(|a, b| {
        b.strength()
            .partial_cmp(&a.strength())
            .unwrap_or(Ordering::Equal)
    });
    items.truncate(config.effective_max_evidence_per_type());
    items
}

/// Whether a rule runs under the given collection config. Evidence kinds map
/// to the analyze flags; an explicit `requires` gate is checked on top.
fn rule_enabled(rule: &CompiledRule, config: &DetectionConfig) -> bool {
    let kind_enabled = match rule.kind {
        EvidenceKind::TablePattern => true,
        EvidenceKind::RelationshipPattern => config.effective_analyze_relationships(),
        EvidenceKind::ColumnAnalysis => config.effective_analyze_column_patterns(),
    };
    if !kind_enabled {
        return false;
    }
    match rule.requires {
        Some(ConfigGate::DetailedTables) => config.effective_detailed_table_analysis(),
        Some(ConfigGate::ColumnPatterns) => config.effective_analyze_column_patterns(),
        Some(ConfigGate::Relationships) => config.effective_analyze_relationships(),
        Some(ConfigGate::BusinessLogic) => config.effective_analyze_business_logic(),
        None => true,
    }
}

/// Run one rule. Returns None when the signal does not fire.
fn evaluate_rule(
    rule: &CompiledRule,
    snapshot: &SchemaSnapshot,
    config: &DetectionConfig,
) -> Option<Evidence> {
    let mut supporting = match &rule.matcher {
        RuleMatcher::TablesPresent { pattern } => match_tables_present(pattern, snapshot),
        RuleMatcher::TablesAbsent { pattern } => match_tables_absent(pattern, snapshot),
        RuleMatcher::TablesCoexist { pattern, related } => {
            match_tables_coexist(pattern, related, snapshot)
        }
        RuleMatcher::Relationship { table, column } => {
            match_relationship(table, column.as_ref(), snapshot)
        }
        RuleMatcher::ColumnMatch { pattern } => match_columns(pattern, snapshot),
        RuleMatcher::DualOwnership {
            first_column,
            second_column,
        } => match_dual_ownership(first_column, second_column, snapshot),
    }?;

    if !config.effective_detailed_table_analysis() {
        supporting.tables.clear();
        supporting.samples.clear();
    }

    Some(Evidence::new(
        rule.kind,
        rule.description.clone(),
        rule.confidence,
        rule.weight,
        supporting,
        rule.indicators,
    ))
}

fn match_tables_present(pattern: &Regex, snapshot: &SchemaSnapshot) -> Option<SupportingData> {
    let matched: Vec<String> = snapshot
        .table_names()
        .filter(|name| pattern.is_match(name))
        .map(String::from)
        .collect();
    if matched.is_empty() {
        return None;
    }
    Some(SupportingData {
        tables: matched,
        patterns: vec![pattern.as_str().to_string()],
        samples: Vec::new(),
    })
}

fn match_tables_absent(pattern: &Regex, snapshot: &SchemaSnapshot) -> Option<SupportingData> {
    if snapshot.table_names().any(|name| pattern.is_match(name)) {
        return None;
    }
    Some(SupportingData {
        tables: Vec::new(),
        patterns: vec![pattern.as_str().to_string()],
        samples: Vec::new(),
    })
}

fn match_tables_coexist(
    pattern: &Regex,
    related: &Regex,
    snapshot: &SchemaSnapshot,
) -> Option<SupportingData> {
    let first: Vec<String> = snapshot
        .table_names()
        .filter(|name| pattern.is_match(name))
        .map(String::from)
        .collect();
    if first.is_empty() {
        return None;
    }
    let second: Vec<String> = snapshot
        .table_names()
        .filter(|name| related.is_match(name))
        .map(String::from)
        .collect();
    if second.is_empty() {
        return None;
    }

    let mut tables = first;
    for name in second {
        if !tables.contains(&name) {
            tables.push(name);
        }
    }
    Some(SupportingData {
        tables,
        patterns: vec![pattern.as_str().to_string(), related.as_str().to_string()],
        samples: Vec::new(),
    })
}

fn match_relationship(
    table: &Regex,
    column: Option<&Regex>,
    snapshot: &SchemaSnapshot,
) -> Option<SupportingData> {
    let mut tables: Vec<String> = Vec::new();
    let mut samples: Vec<String> = Vec::new();

    for rel in snapshot.relationships() {
        let endpoint_hit = table.is_match(&rel.from_table) || table.is_match(&rel.to_table);
        if !endpoint_hit {
            continue;
        }
        if let Some(column) = column {
            if !column.is_match(&rel.column_name) {
                continue;
            }
        }
        samples.push(format!(
            "{} -> {} ({})",
            rel.from_table, rel.to_table, rel.column_name
        ));
        for name in [&rel.from_table, &rel.to_table] {
            if !tables.contains(name) {
                tables.push(name.clone());
            }
        }
    }

    if samples.is_empty() {
        return None;
    }
    Some(SupportingData {
        tables,
        patterns: vec![table.as_str().to_string()],
        samples,
    })
}

fn match_columns(pattern: &Regex, snapshot: &SchemaSnapshot) -> Option<SupportingData> {
    let mut samples: Vec<String> = Vec::new();
    for column in snapshot.relationship_columns() {
        if pattern.is_match(column) && !samples.iter().any(|s| s == column) {
            samples.push(column.to_string());
        }
    }
    if samples.is_empty() {
        return None;
    }
    Some(SupportingData {
        tables: Vec::new(),
        patterns: vec![pattern.as_str().to_string()],
        samples,
    })
}

/// A table qualifies when its incident relationships carry one column
/// matching `first` and another matching `second`: two ownership models
/// pointing at the same content.
fn match_dual_ownership(
    first: &Regex,
    second: &Regex,
    snapshot: &SchemaSnapshot,
) -> Option<SupportingData> {
    let mut tables: Vec<String> = Vec::new();
    let mut samples: Vec<String> = Vec::new();

    for name in snapshot.table_names() {
        let mut first_hit: Option<&str> = None;
        let mut second_hit: Option<&str> = None;
        for rel in snapshot.relationships() {
            if rel.from_table != name && rel.to_table != name {
                continue;
            }
            if first_hit.is_none() && first.is_match(&rel.column_name) {
                first_hit = Some(&rel.column_name);
            } else if second_hit.is_none() && second.is_match(&rel.column_name) {
                second_hit = Some(&rel.column_name);
            }
        }
        if let (Some(a), Some(b)) = (first_hit, second_hit) {
            samples.push(format!("{name}: {a} + {b}"));
            tables.push(name.to_string());
        }
    }

    if tables.is_empty() {
        return None;
    }
    Some(SupportingData {
        tables,
        patterns: vec![first.as_str().to_string(), second.as_str().to_string()],
        samples,
    })
}
