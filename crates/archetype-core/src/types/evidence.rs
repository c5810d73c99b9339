//! Evidence items emitted during schema analysis.
//!
//! Each item is one weighted, confidence-scored observation about the
//! snapshot, carrying an affinity score toward each architecture hypothesis.
//! Items live only for the duration of one detection call; only the
//! aggregated result is ever persisted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The three architecture hypotheses.
///
/// Scoring buckets are mutually informative, not mutually exclusive: a
/// single evidence item may support more than one hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    /// Content is owned by individual user accounts.
    Individual,
    /// Content is owned by teams or organizations.
    Team,
    /// Both ownership models coexist on the same content.
    Hybrid,
}

impl Architecture {
    /// All hypotheses, in scoring order. Ties resolve to the earliest.
    pub const ALL: [Architecture; 3] = [Self::Individual, Self::Team, Self::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Team => "team",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three evidence kinds, matching the signal classes rules scan for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// A table-name pattern was (or was deliberately not) present.
    TablePattern,
    /// A relationship shape between tables matched.
    RelationshipPattern,
    /// A foreign-key column naming pattern matched.
    ColumnAnalysis,
}

/// Per-hypothesis affinity of one evidence item (0.0-1.0 each).
/// Values are independent scores, not a distribution; they need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ArchitectureIndicators {
    pub individual: f64,
    pub team: f64,
    pub hybrid: f64,
}

impl ArchitectureIndicators {
    pub fn new(individual: f64, team: f64, hybrid: f64) -> Self {
        Self {
            individual: individual.clamp(0.0, 1.0),
            team: team.clamp(0.0, 1.0),
            hybrid: hybrid.clamp(0.0, 1.0),
        }
    }

    pub fn get(&self, architecture: Architecture) -> f64 {
        match architecture {
            Architecture::Individual => self.individual,
            Architecture::Team => self.team,
            Architecture::Hybrid => self.hybrid,
        }
    }

    /// The hypothesis with the highest affinity. Ties resolve to the
    /// earliest entry in [`Architecture::ALL`].
    pub fn dominant(&self) -> (Architecture, f64) {
        let mut best = (Architecture::Individual, self.individual);
        for architecture in [Architecture::Team, Architecture::Hybrid] {
            let value = self.get(architecture);
            if value > best.1 {
                best = (architecture, value);
            }
        }
        best
    }

    /// How many hypotheses this item supports above `threshold`.
    pub fn supported_above(&self, threshold: f64) -> usize {
        Architecture::ALL
            .iter()
            .filter(|a| self.get(**a) > threshold)
            .count()
    }
}

/// Raw material backing one evidence item: the tables, patterns, and sample
/// values that triggered it. Informational only, never scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SupportingData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<String>,
}

impl SupportingData {
    pub fn tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// One weighted observation about the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    /// Which signal class produced this item.
    pub kind: EvidenceKind,
    /// Human-readable description of what was observed.
    pub description: String,
    /// How certain the observation itself is (0.0-1.0).
    pub confidence: f64,
    /// How diagnostic this signal class is (0.0-1.0).
    pub weight: f64,
    /// What triggered the observation.
    pub supporting_data: SupportingData,
    /// Affinity toward each hypothesis.
    pub indicators: ArchitectureIndicators,
}

impl Default for Evidence {
    fn default() -> Self {
        Self {
            kind: EvidenceKind::TablePattern,
            description: String::new(),
            confidence: 0.0,
            weight: 0.0,
            supporting_data: SupportingData::default(),
            indicators: ArchitectureIndicators::default(),
        }
    }
}

impl Evidence {
    /// Create a new evidence item. Confidence and weight are clamped to
    /// [0.0, 1.0].
    pub fn new(
        kind: EvidenceKind,
        description: impl Into<String>,
        confidence: f64,
        weight: f64,
        supporting_data: SupportingData,
        indicators: ArchitectureIndicators,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            confidence: confidence.clamp(0.0, 1.0),
            weight: weight.clamp(0.0, 1.0),
            supporting_data,
            indicators,
        }
    }

    /// Combined strength used for ranking and score aggregation.
    pub fn strength(&self) -> f64 {
        self.confidence * self.weight
    }
}
