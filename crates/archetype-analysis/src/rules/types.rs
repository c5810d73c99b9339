//! Core types for the evidence rule system.
//!
//! These serde types define the TOML schema for rule packs. One pack per
//! architecture hypothesis ships builtin; deployments may add custom packs
//! to recalibrate patterns and weights without touching code.

use serde::{Deserialize, Serialize};

use archetype_core::types::evidence::ArchitectureIndicators;

/// Top-level rule pack definition (one per TOML file).
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RulePackSpec {
    /// Pack metadata.
    pub pack: PackMeta,
    /// Evidence rule definitions.
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// Pack metadata.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PackMeta {
    /// Unique pack identifier (e.g., "individual", "team").
    pub name: String,
    /// Display name for reporting.
    pub display_name: Option<String>,
    /// Pack version string (e.g., "1.0.0").
    pub version: Option<String>,
    /// What this pack detects.
    pub description: Option<String>,
}

/// What a rule scans for in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// `pattern` matches at least one table name.
    TablesPresent,
    /// `pattern` matches no table name (only fires on non-empty snapshots).
    TablesAbsent,
    /// `pattern` and `related_pattern` each match at least one table name.
    TablesCoexist,
    /// A relationship has an endpoint matching `pattern`; when
    /// `related_pattern` is set the relationship column must match it too.
    Relationship,
    /// `pattern` matches at least one relationship column name.
    ColumnMatch,
    /// One table participates in relationships whose columns match both
    /// `pattern` and `related_pattern` (two ownership models on one table).
    DualOwnership,
}

/// Evidence collection knob a rule can be gated behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfigGate {
    DetailedTables,
    ColumnPatterns,
    Relationships,
    BusinessLogic,
}

/// A single evidence rule within a pack.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RuleDef {
    /// Unique rule ID within the pack (e.g., "team-tables-present").
    pub id: String,
    /// What to scan for.
    pub signal: SignalKind,
    /// Human-readable description; becomes the evidence description.
    pub description: String,
    /// How certain the observation is when the signal fires (0.0-1.0).
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// How diagnostic the signal is (0.0-1.0).
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Primary regex. Matched case-insensitively.
    pub pattern: Option<String>,
    /// Secondary regex; meaning depends on the signal kind.
    pub related_pattern: Option<String>,
    /// Per-hypothesis affinity this rule contributes when it fires.
    #[serde(default)]
    pub indicators: ArchitectureIndicators,
    /// Optional config gate; the rule is skipped when the knob is off.
    pub requires: Option<ConfigGate>,
}

fn default_confidence() -> f64 {
    0.80
}

fn default_weight() -> f64 {
    0.80
}

/// Generate a JSON Schema for the `RulePackSpec` type.
///
/// Custom pack authors can use this schema to validate their TOML files.
pub fn generate_json_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(RulePackSpec)
}
