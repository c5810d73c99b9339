//! Platform feature extraction from schema snapshots.
//!
//! Independent of hypothesis scoring: features describe what the platform
//! has (authentication, profiles, team collaboration), not which ownership
//! model it uses. Downstream configuration generators consume both.

use regex::{Regex, RegexBuilder};

use archetype_core::types::evidence::Architecture;
use archetype_core::types::snapshot::SchemaSnapshot;
use archetype_core::types::PlatformFeature;

const FEATURE_BASE_CONFIDENCE: f64 = 0.6;
const FEATURE_PER_TABLE_BONUS: f64 = 0.1;
const FEATURE_MAX_CONFIDENCE: f64 = 0.95;

struct SignatureDef {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    table_pattern: &'static str,
    typically_indicates: &'static [Architecture],
    common_in_domains: &'static [&'static str],
}

const BUILTIN_SIGNATURES: &[SignatureDef] = &[
    SignatureDef {
        id: "authentication",
        name: "Authentication",
        category: "identity",
        table_pattern: r"^(users?|accounts?|user_accounts?|sessions?|credentials?|auth_\w+)$",
        typically_indicates: &[
            Architecture::Individual,
            Architecture::Team,
            Architecture::Hybrid,
        ],
        common_in_domains: &["saas", "social", "ecommerce"],
    },
    SignatureDef {
        id: "profile_management",
        name: "Profile management",
        category: "identity",
        table_pattern: r"^(profiles?|user_profiles?|user_settings?|preferences?|avatars?)$",
        typically_indicates: &[Architecture::Individual, Architecture::Hybrid],
        common_in_domains: &["social", "saas"],
    },
    SignatureDef {
        id: "team_collaboration",
        name: "Team collaboration",
        category: "collaboration",
        table_pattern: r"^(teams?|team_members?|organizations?|orgs?|workspaces?|memberships?|invitations?)$",
        typically_indicates: &[Architecture::Team, Architecture::Hybrid],
        common_in_domains: &["saas", "project_management"],
    },
];

struct CompiledSignature {
    def: &'static SignatureDef,
    pattern: Regex,
}

/// Compiled feature signatures. Built once and shared across detections.
pub struct FeatureCatalog {
    signatures: Vec<CompiledSignature>,
}

impl FeatureCatalog {
    /// Compile the builtin signature set. A signature whose pattern fails to
    /// compile is skipped with a warning instead of poisoning the catalog.
    pub fn builtin() -> Self {
        let mut signatures = Vec::with_capacity(BUILTIN_SIGNATURES.len());
        for def in BUILTIN_SIGNATURES {
            match RegexBuilder::new(def.table_pattern)
                .case_insensitive(true)
                .build()
            {
                Ok(pattern) => signatures.push(CompiledSignature { def, pattern }),
                Err(e) => {
                    eprintln!(
                        "[archetype] warning: skipping feature signature '{}': {e}",
                        def.id
                    );
                }
            }
        }
        Self { signatures }
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Emit one feature per signature with at least one implementing table.
    /// Confidence grows with the number of implementing tables.
    pub fn extract(&self, snapshot: &SchemaSnapshot) -> Vec<PlatformFeature> {
        let mut features = Vec::new();
        for sig in &self.signatures {
            let implementing: Vec<String> = snapshot
                .table_names()
                .filter(|name| sig.pattern.is_match(name))
                .map(String::from)
                .collect();
            if implementing.is_empty() {
                continue;
            }

            let confidence = (FEATURE_BASE_CONFIDENCE
                + FEATURE_PER_TABLE_BONUS * implementing.len() as f64)
                .min(FEATURE_MAX_CONFIDENCE);
            let evidence = implementing
                .iter()
                .map(|table| format!("table '{table}' matches the {} signature", sig.def.id))
                .collect();

            features.push(PlatformFeature {
                id: sig.def.id.to_string(),
                name: sig.def.name.to_string(),
                category: sig.def.category.to_string(),
                present: true,
                confidence,
                evidence,
                implementing_tables: implementing,
                typically_indicates: sig.def.typically_indicates.to_vec(),
                common_in_domains: sig
                    .def
                    .common_in_domains
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            });
        }
        features
    }
}

impl Default for FeatureCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_signatures_all_compile() {
        let catalog = FeatureCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_SIGNATURES.len());
    }

    #[test]
    fn test_auth_feature_detected_from_users_table() {
        let catalog = FeatureCatalog::builtin();
        let snapshot = SchemaSnapshot::new(["users", "posts"], vec![]);
        let features = catalog.extract(&snapshot);

        let auth = features
            .iter()
            .find(|f| f.id == "authentication")
            .expect("authentication feature present");
        assert!(auth.present);
        assert_eq!(auth.implementing_tables, vec!["users"]);
        assert!((auth.confidence - 0.7).abs() < 1e-10);
        assert_eq!(auth.category, "identity");
    }

    #[test]
    fn test_confidence_grows_with_tables_and_caps() {
        let catalog = FeatureCatalog::builtin();
        let snapshot = SchemaSnapshot::new(
            ["users", "accounts", "sessions", "credentials", "auth_tokens"],
            vec![],
        );
        let features = catalog.extract(&snapshot);
        let auth = features
            .iter()
            .find(|f| f.id == "authentication")
            .expect("authentication feature present");
        assert_eq!(auth.implementing_tables.len(), 5);
        assert!((auth.confidence - 0.95).abs() < 1e-10, "confidence is capped");
    }

    #[test]
    fn test_collaboration_feature_indicates_team_architectures() {
        let catalog = FeatureCatalog::builtin();
        let snapshot = SchemaSnapshot::new(["teams", "team_members"], vec![]);
        let features = catalog.extract(&snapshot);
        let collab = features
            .iter()
            .find(|f| f.id == "team_collaboration")
            .expect("collaboration feature present");
        assert_eq!(
            collab.typically_indicates,
            vec![Architecture::Team, Architecture::Hybrid]
        );
        assert_eq!(collab.evidence.len(), 2);
    }

    #[test]
    fn test_no_features_for_unrelated_schema() {
        let catalog = FeatureCatalog::builtin();
        let snapshot = SchemaSnapshot::new(["invoices", "line_items"], vec![]);
        assert!(catalog.extract(&snapshot).is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let catalog = FeatureCatalog::builtin();
        let snapshot = SchemaSnapshot::new(["Users"], vec![]);
        let features = catalog.extract(&snapshot);
        assert!(features.iter().any(|f| f.id == "authentication"));
    }
}
