//! Persisted cache entry shape.
//!
//! One serialized record per entry, addressed by its key. Readers tolerate
//! unknown fields so old engines can read entries written by newer ones;
//! anything unreadable is treated as absent and evicted.

use serde::{Deserialize, Serialize};

use archetype_core::constants::{DEFAULT_CACHE_TTL_MS, ENGINE_VERSION};
use archetype_core::types::analysis::{ConfidenceLevel, EvidenceAnalysisResult};

use crate::keys::DatabaseIdentity;

/// Bookkeeping attached to every cached detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheEntryMetadata {
    /// Unix milliseconds at entry creation.
    pub created_at_ms: u64,
    /// Unix milliseconds of the most recent hit.
    pub last_accessed_at_ms: u64,
    /// Number of cache hits served from this entry.
    pub access_count: u64,
    /// Engine version that produced the entry. A mismatch on read always
    /// invalidates, whatever the invalidation strategy.
    pub engine_version: String,
    /// Entry lifetime in milliseconds, measured from `created_at_ms`.
    pub ttl_ms: u64,
    /// Coarse confidence label for quick filtering.
    pub confidence_level: ConfidenceLevel,
}

impl Default for CacheEntryMetadata {
    fn default() -> Self {
        Self {
            created_at_ms: 0,
            last_accessed_at_ms: 0,
            access_count: 0,
            engine_version: ENGINE_VERSION.to_string(),
            ttl_ms: DEFAULT_CACHE_TTL_MS,
            confidence_level: ConfidenceLevel::Medium,
        }
    }
}

/// A cached detection result plus everything needed to revalidate it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionCacheEntry {
    /// The cache key this entry is stored under.
    pub key: String,
    /// Schema fingerprint at detection time.
    pub schema_hash: String,
    /// Normalized identity of the source database, credentials stripped.
    pub database_identity: DatabaseIdentity,
    /// The full analysis payload.
    pub detection_results: EvidenceAnalysisResult,
    /// Opaque downstream generator configuration, stored alongside the
    /// result when the caller derived one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_configuration: Option<serde_json::Value>,
    pub metadata: CacheEntryMetadata,
}

impl DetectionCacheEntry {
    pub fn new(
        key: impl Into<String>,
        database_identity: DatabaseIdentity,
        schema_hash: impl Into<String>,
        detection_results: EvidenceAnalysisResult,
        auto_configuration: Option<serde_json::Value>,
        ttl_ms: u64,
        now_ms: u64,
    ) -> Self {
        let confidence_level = detection_results.confidence_level();
        Self {
            key: key.into(),
            schema_hash: schema_hash.into(),
            database_identity,
            detection_results,
            auto_configuration,
            metadata: CacheEntryMetadata {
                created_at_ms: now_ms,
                last_accessed_at_ms: now_ms,
                access_count: 0,
                engine_version: ENGINE_VERSION.to_string(),
                ttl_ms,
                confidence_level,
            },
        }
    }

    /// Whether the entry has outlived its TTL at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.metadata.created_at_ms) > self.metadata.ttl_ms
    }

    /// Record a cache hit.
    pub fn touch(&mut self, now_ms: u64) {
        self.metadata.access_count += 1;
        self.metadata.last_accessed_at_ms = now_ms;
    }
}

/// Current wall-clock time in Unix milliseconds.
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(overall_confidence: f64, ttl_ms: u64) -> DetectionCacheEntry {
        let results = EvidenceAnalysisResult {
            overall_confidence,
            ..Default::default()
        };
        DetectionCacheEntry::new(
            "k1",
            DatabaseIdentity::default(),
            "schema-hash",
            results,
            None,
            ttl_ms,
            1_000,
        )
    }

    #[test]
    fn test_confidence_level_derived_from_result() {
        assert_eq!(
            make_entry(0.85, 100).metadata.confidence_level,
            ConfidenceLevel::High
        );
        assert_eq!(
            make_entry(0.6, 100).metadata.confidence_level,
            ConfidenceLevel::Medium
        );
    }

    #[test]
    fn test_expiry_is_strictly_after_ttl() {
        let entry = make_entry(0.9, 100);
        assert!(!entry.is_expired(1_100), "exactly at TTL is still valid");
        assert!(entry.is_expired(1_101));
    }

    #[test]
    fn test_expiry_tolerates_clock_before_creation() {
        let entry = make_entry(0.9, 100);
        assert!(!entry.is_expired(500));
    }

    #[test]
    fn test_touch_updates_access_tracking() {
        let mut entry = make_entry(0.9, 100);
        entry.touch(2_000);
        entry.touch(3_000);
        assert_eq!(entry.metadata.access_count, 2);
        assert_eq!(entry.metadata.last_accessed_at_ms, 3_000);
    }

    #[test]
    fn test_entry_round_trips_through_json() {
        let entry = make_entry(0.9, 100);
        let json = serde_json::to_string(&entry).expect("serialize entry");
        let back: DetectionCacheEntry = serde_json::from_str(&json).expect("deserialize entry");
        assert_eq!(back, entry);
    }

    #[test]
    fn test_entry_tolerates_unknown_fields() {
        let json = r#"{"key": "k", "future_field": true, "metadata": {"ttl_ms": 5}}"#;
        let entry: DetectionCacheEntry =
            serde_json::from_str(json).expect("deserialize with unknown fields");
        assert_eq!(entry.key, "k");
        assert_eq!(entry.metadata.ttl_ms, 5);
    }
}
