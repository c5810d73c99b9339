//! Rule pack registry: loads builtin packs plus user custom packs.
//!
//! Builtin packs are embedded at compile time via `include_str!`, one per
//! architecture hypothesis. User packs are loaded from a configurable
//! directory at runtime and appended after the builtins.

use std::path::Path;

use archetype_core::errors::rule_error::RuleResult;

use super::diagnostics::RuleDiagnostics;
use super::loader::{self, CompiledRulePack};

/// Configuration for rule pack filtering.
#[derive(Debug, Clone, Default)]
pub struct PackConfig {
    /// Pack names to disable (excluded from loading).
    pub disabled_packs: Vec<String>,
    /// If set, only these pack names are loaded.
    pub enabled_only: Option<Vec<String>>,
}

/// Registry of all loaded rule packs, in load order.
pub struct RulePackRegistry {
    packs: Vec<CompiledRulePack>,
    diag: RuleDiagnostics,
}

impl RulePackRegistry {
    /// Create a registry with only the builtin packs.
    pub fn with_builtins() -> Self {
        Self::with_builtins_filtered(None)
    }

    /// Create a registry with builtin packs, applying an optional filter.
    pub fn with_builtins_filtered(config: Option<&PackConfig>) -> Self {
        let mut packs = Vec::new();
        let mut diag = RuleDiagnostics::default();

        // Load each builtin pack. If any fails to compile, log and skip.
        for (name, toml_str) in builtin_packs() {
            if let Some(cfg) = config {
                if Self::is_pack_disabled(name, cfg) {
                    diag.builtin_packs_skipped += 1;
                    continue;
                }
            }
            match loader::load_from_str(toml_str, name) {
                Ok(pack) => {
                    diag.total_rules_compiled += pack.rules.len();
                    diag.rules_skipped += pack.rules_skipped;
                    diag.builtin_packs_loaded += 1;
                    if let Some(ref ver) = pack.version {
                        diag.pack_versions.insert(pack.name.clone(), ver.clone());
                    }
                    packs.push(pack);
                }
                Err(e) => {
                    eprintln!("[archetype] warning: failed to load builtin pack '{name}': {e}");
                    diag.builtin_packs_skipped += 1;
                }
            }
        }

        Self { packs, diag }
    }

    /// Create a registry with builtin packs plus user packs from a directory.
    pub fn with_builtins_and_custom(custom_dir: &Path) -> Self {
        Self::with_builtins_and_custom_filtered(custom_dir, None)
    }

    /// Create a registry with builtin plus custom packs, applying an
    /// optional filter. Custom packs run after the builtins; a custom pack
    /// never replaces a builtin, it adds to it.
    pub fn with_builtins_and_custom_filtered(
        custom_dir: &Path,
        config: Option<&PackConfig>,
    ) -> Self {
        let mut registry = Self::with_builtins_filtered(config);

        if custom_dir.is_dir() {
            if let Ok(entries) = std::fs::read_dir(custom_dir) {
                let mut paths: Vec<_> = entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
                    .collect();
                // Directory iteration order is platform-defined; sort so
                // rule evaluation order is stable across runs.
                paths.sort();

                for path in paths {
                    match loader::load_from_file(&path) {
                        Ok(pack) => {
                            if let Some(cfg) = config {
                                if Self::is_pack_disabled(&pack.name, cfg) {
                                    registry.diag.custom_packs_skipped += 1;
                                    continue;
                                }
                            }
                            registry.diag.total_rules_compiled += pack.rules.len();
                            registry.diag.rules_skipped += pack.rules_skipped;
                            registry.diag.custom_packs_loaded += 1;
                            if let Some(ref ver) = pack.version {
                                registry
                                    .diag
                                    .pack_versions
                                    .insert(pack.name.clone(), ver.clone());
                            }
                            registry.packs.push(pack);
                        }
                        Err(e) => {
                            eprintln!(
                                "[archetype] warning: failed to load custom pack '{}': {e}",
                                path.display()
                            );
                            registry.diag.custom_packs_skipped += 1;
                        }
                    }
                }
            }
        }

        registry
    }

    /// Load a single pack from a TOML string (for testing).
    pub fn load_single(toml_str: &str) -> RuleResult<CompiledRulePack> {
        loader::load_from_str(toml_str, "inline")
    }

    /// Consume the registry and return all packs in load order.
    pub fn into_packs(self) -> Vec<CompiledRulePack> {
        self.packs
    }

    pub fn packs(&self) -> &[CompiledRulePack] {
        &self.packs
    }

    pub fn pack_count(&self) -> usize {
        self.packs.len()
    }

    /// Total rule count across all packs.
    pub fn rule_count(&self) -> usize {
        self.packs.iter().map(|p| p.rules.len()).sum()
    }

    /// Load-time diagnostics.
    pub fn diagnostics(&self) -> &RuleDiagnostics {
        &self.diag
    }

    fn is_pack_disabled(name: &str, config: &PackConfig) -> bool {
        if let Some(ref enabled) = config.enabled_only {
            return !enabled.iter().any(|e| e == name);
        }
        config.disabled_packs.iter().any(|d| d == name)
    }
}

/// Builtin rule packs embedded at compile time, one per hypothesis.
/// Load order fixes evidence ordering, so keep this list stable.
fn builtin_packs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("individual", include_str!("packs/individual.toml")),
        ("team", include_str!("packs/team.toml")),
        ("hybrid", include_str!("packs/hybrid.toml")),
    ]
}
