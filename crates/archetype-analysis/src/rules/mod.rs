//! Declarative detection rules.
//!
//! Hypothesis knowledge lives in TOML rule packs, not in code. Three builtin
//! packs ship embedded in the binary (individual, team, hybrid); custom packs
//! can be loaded from a directory alongside them. One generic evaluator in
//! [`crate::collector`] runs them all.

pub mod diagnostics;
pub mod loader;
pub mod registry;
pub mod types;

pub use diagnostics::RuleDiagnostics;
pub use loader::{CompiledRule, CompiledRulePack, RuleMatcher};
pub use registry::{PackConfig, RulePackRegistry};
pub use types::{generate_json_schema, ConfigGate, RuleDef, RulePackSpec, SignalKind};
