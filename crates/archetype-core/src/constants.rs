//! Shared constants for the Archetype detection engine.

/// Engine version string, stamped into every cache entry.
/// A version mismatch on read always invalidates the entry.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default cache entry TTL in milliseconds (24 hours).
pub const DEFAULT_CACHE_TTL_MS: u64 = 86_400_000;

/// Default maximum total cache size in bytes (50MB).
pub const DEFAULT_MAX_CACHE_SIZE_BYTES: u64 = 52_428_800;

/// Default maximum number of cache entries.
pub const DEFAULT_MAX_CACHE_ENTRIES: usize = 100;

/// Default minimum overall confidence required before a result is cached.
pub const DEFAULT_MIN_CONFIDENCE_TO_CACHE: f64 = 0.5;

/// Default maximum evidence items kept per evidence kind.
pub const DEFAULT_MAX_EVIDENCE_PER_TYPE: usize = 10;

/// Default minimum confidence for an evidence item to be kept at all.
pub const DEFAULT_MIN_EVIDENCE_CONFIDENCE: f64 = 0.3;

// ---- Overall-confidence formula ----
//
// overall = W_MEAN * mean(confidence)
//         + W_VOLUME * min(count / VOLUME_SATURATION, 1)
//         + W_SEPARATION * (top_score - second_score)

/// Weight of the mean evidence confidence term.
pub const CONFIDENCE_WEIGHT_MEAN: f64 = 0.4;

/// Weight of the evidence-volume term.
pub const CONFIDENCE_WEIGHT_VOLUME: f64 = 0.3;

/// Weight of the score-separation term.
pub const CONFIDENCE_WEIGHT_SEPARATION: f64 = 0.3;

/// Evidence count at which the volume term saturates at 1.0.
pub const CONFIDENCE_VOLUME_SATURATION: f64 = 10.0;

// ---- Warning thresholds ----

/// Below this many evidence items, the result carries a low-evidence warning.
pub const WARN_MIN_EVIDENCE_COUNT: usize = 3;

/// Evidence strength above which conflicting indicators are worth flagging.
pub const WARN_CONFLICT_STRENGTH: f64 = 0.5;

/// Indicator value above which a hypothesis counts as supported by an item.
pub const WARN_CONFLICT_INDICATOR: f64 = 0.4;

/// Gap between an item's top two indicators below which neither dominates.
pub const WARN_CONFLICT_MARGIN: f64 = 0.2;

/// Minimum gap between the top two scores before an ambiguity warning fires.
pub const WARN_SCORE_SEPARATION: f64 = 0.2;

/// Overall confidence below which a low-confidence warning fires.
pub const WARN_LOW_CONFIDENCE: f64 = 0.6;

/// Overall confidence at or above which a cached entry is labelled `high`.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Number of evidence items rendered into the reasoning trail.
pub const REASONING_TOP_EVIDENCE: usize = 5;
