//! TOML rule pack loader: parses and compiles rule definitions.
//!
//! Regexes are compiled once at load time so evaluation is allocation-free
//! per snapshot. Invalid rules are skipped with a warning instead of failing
//! the whole pack; a pack whose rules all fail to compile is rejected.

use regex::{Regex, RegexBuilder};

use archetype_core::errors::rule_error::{RuleError, RuleResult};
use archetype_core::types::evidence::{ArchitectureIndicators, EvidenceKind};

use super::types::{ConfigGate, RuleDef, RulePackSpec, SignalKind};

/// A compiled rule pack ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRulePack {
    /// Pack identifier.
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Pack version string.
    pub version: Option<String>,
    /// Compiled rules in declaration order.
    pub rules: Vec<CompiledRule>,
    /// Rules dropped during compilation (bad regex, missing fields).
    pub rules_skipped: usize,
}

/// A compiled evidence rule.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Rule ID, unique within its pack.
    pub id: String,
    /// Owning pack name.
    pub pack: String,
    /// Evidence kind this rule emits, derived from its signal.
    pub kind: EvidenceKind,
    /// Compiled matcher.
    pub matcher: RuleMatcher,
    pub description: String,
    pub confidence: f64,
    pub weight: f64,
    pub indicators: ArchitectureIndicators,
    pub requires: Option<ConfigGate>,
}

/// Compiled matcher variants. All regexes are case-insensitive.
#[derive(Debug, Clone)]
pub enum RuleMatcher {
    TablesPresent {
        pattern: Regex,
    },
    TablesAbsent {
        pattern: Regex,
    },
    TablesCoexist {
        pattern: Regex,
        related: Regex,
    },
    Relationship {
        table: Regex,
        column: Option<Regex>,
    },
    ColumnMatch {
        pattern: Regex,
    },
    DualOwnership {
        first_column: Regex,
        second_column: Regex,
    },
}

/// Load and compile a rule pack from a TOML string.
pub fn load_from_str(toml_str: &str, source_name: &str) -> RuleResult<CompiledRulePack> {
    let spec: RulePackSpec = toml::from_str(toml_str).map_err(|e| RuleError::PackParse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })?;
    compile_spec(spec)
}

/// Load and compile a rule pack from a file path.
pub fn load_from_file(path: &std::path::Path) -> RuleResult<CompiledRulePack> {
    let content = std::fs::read_to_string(path).map_err(|e| RuleError::PackParse {
        source_name: path.display().to_string(),
        message: format!("failed to read file: {e}"),
    })?;
    load_from_str(&content, &path.display().to_string())
}

fn compile_spec(spec: RulePackSpec) -> RuleResult<CompiledRulePack> {
    let declared = spec.rules.len();
    let mut rules = Vec::with_capacity(declared);
    let mut rules_skipped = 0usize;

    for def in spec.rules {
        match compile_rule(&spec.pack.name, def) {
            Ok(rule) => rules.push(rule),
            Err(e) => {
                eprintln!(
                    "[archetype] warning: skipping rule in pack '{}': {e}",
                    spec.pack.name
                );
                rules_skipped += 1;
            }
        }
    }

    if declared > 0 && rules.is_empty() {
        return Err(RuleError::EmptyPack {
            pack: spec.pack.name,
        });
    }

    let display_name = spec
        .pack
        .display_name
        .unwrap_or_else(|| spec.pack.name.clone());

    Ok(CompiledRulePack {
        name: spec.pack.name,
        display_name,
        version: spec.pack.version,
        rules,
        rules_skipped,
    })
}

fn compile_rule(pack: &str, def: RuleDef) -> RuleResult<CompiledRule> {
    let matcher = compile_matcher(pack, &def)?;

    Ok(CompiledRule {
        kind: evidence_kind_for(def.signal),
        matcher,
        id: def.id,
        pack: pack.to_string(),
        description: def.description,
        confidence: def.confidence.clamp(0.0, 1.0),
        weight: def.weight.clamp(0.0, 1.0),
        indicators: def.indicators,
        requires: def.requires,
    })
}

fn compile_matcher(pack: &str, def: &RuleDef) -> RuleResult<RuleMatcher> {
    let pattern = compile_required(pack, &def.id, "pattern", def.pattern.as_deref())?;

    Ok(match def.signal {
        SignalKind::TablesPresent => RuleMatcher::TablesPresent { pattern },
        SignalKind::TablesAbsent => RuleMatcher::TablesAbsent { pattern },
        SignalKind::TablesCoexist => RuleMatcher::TablesCoexist {
            related: compile_required(pack, &def.id, "related_pattern", def.related_pattern.as_deref())?,
            pattern,
        },
        SignalKind::Relationship => RuleMatcher::Relationship {
            table: pattern,
            column: compile_optional(pack, &def.id, "related_pattern", def.related_pattern.as_deref())?,
        },
        SignalKind::ColumnMatch => RuleMatcher::ColumnMatch { pattern },
        SignalKind::DualOwnership => RuleMatcher::DualOwnership {
            second_column: compile_required(pack, &def.id, "related_pattern", def.related_pattern.as_deref())?,
            first_column: pattern,
        },
    })
}

/// Which evidence kind a signal produces.
fn evidence_kind_for(signal: SignalKind) -> EvidenceKind {
    match signal {
        SignalKind::TablesPresent | SignalKind::TablesAbsent | SignalKind::TablesCoexist => {
            EvidenceKind::TablePattern
        }
        SignalKind::Relationship | SignalKind::DualOwnership => EvidenceKind::RelationshipPattern,
        SignalKind::ColumnMatch => EvidenceKind::ColumnAnalysis,
    }
}

fn compile_required(
    pack: &str,
    rule_id: &str,
    field: &str,
    value: Option<&str>,
) -> RuleResult<Regex> {
    let raw = value.filter(|v| !v.is_empty()).ok_or_else(|| RuleError::PackParse {
        source_name: pack.to_string(),
        message: format!("rule '{rule_id}' is missing required field '{field}'"),
    })?;
    compile_regex(pack, rule_id, field, raw)
}

fn compile_optional(
    pack: &str,
    rule_id: &str,
    field: &str,
    value: Option<&str>,
) -> RuleResult<Option<Regex>> {
    match value.filter(|v| !v.is_empty()) {
        Some(raw) => Ok(Some(compile_regex(pack, rule_id, field, raw)?)),
        None => Ok(None),
    }
}

/// Compile one regex, case-insensitive. Identifier patterns are authored
/// without case qualifiers; schemas use mixed casing in the wild.
fn compile_regex(pack: &str, rule_id: &str, field: &str, raw: &str) -> RuleResult<Regex> {
    RegexBuilder::new(raw)
        .case_insensitive(true)
        .build()
        .map_err(|e| RuleError::PackParse {
            source_name: pack.to_string(),
            message: format!("invalid regex in rule '{rule_id}' field '{field}': {e}"),
        })
}
