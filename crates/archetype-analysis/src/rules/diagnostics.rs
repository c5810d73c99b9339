//! Rule pack diagnostics: load metrics surfaced for logs and debugging.

use archetype_core::FxHashMap;

/// Aggregated diagnostics from rule pack loading.
#[derive(Debug, Clone, Default)]
pub struct RuleDiagnostics {
    pub builtin_packs_loaded: usize,
    pub builtin_packs_skipped: usize,
    pub custom_packs_loaded: usize,
    pub custom_packs_skipped: usize,
    pub total_rules_compiled: usize,
    pub rules_skipped: usize,
    pub pack_versions: FxHashMap<String, String>,
}

impl RuleDiagnostics {
    /// Format a one-line summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "rule packs: {} loaded ({} builtin, {} custom), {} rules compiled, {} rules skipped",
            self.builtin_packs_loaded + self.custom_packs_loaded,
            self.builtin_packs_loaded,
            self.custom_packs_loaded,
            self.total_rules_compiled,
            self.rules_skipped,
        )
    }
}
