//! Detection result cache.
//!
//! Orchestrates entry lifecycle on top of an [`EntryStore`]: confidence
//! gating on write, revalidation on read, TTL cleanup, and bounded-size
//! eviction. Every public operation is infallible by contract: cache
//! failures are logged and degrade to "not cached" or "cache miss", never
//! into the caller's control flow.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use archetype_core::config::{CacheConfig, DetectionConfig};
use archetype_core::constants::ENGINE_VERSION;
use archetype_core::errors::cache_error::{CacheError, CacheResult};
use archetype_core::errors::error_code::ArchetypeErrorCode;
use archetype_core::types::analysis::{ConfidenceLevel, EvidenceAnalysisResult};

use crate::entry::{now_ms, DetectionCacheEntry};
use crate::keys::{self, DatabaseIdentity};
use crate::store::{EntryStore, MemoryStore, SqliteStore};

/// File name of the SQLite store inside the resolved cache directory.
const CACHE_FILE_NAME: &str = "detection_cache.db";

/// Aggregate cache health counters.
///
/// `hits`, `misses`, and `hit_rate` cover lookups made by this process;
/// they are not persisted across restarts. The entry counts come from a
/// scan of the store at call time.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CacheStatistics {
    pub entry_count: usize,
    pub total_size_bytes: u64,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`; 0.0 before the first lookup.
    pub hit_rate: f64,
    /// Entries past their TTL that cleanup has not swept yet.
    pub expired_entries: usize,
    pub high_confidence_entries: usize,
    /// Expired entries swept by this process.
    pub expired_removed: u64,
    /// Entries evicted under size pressure by this process.
    pub evicted: u64,
}

/// Persisted cache of detection results, keyed by database identity,
/// schema fingerprint, and detection options.
pub struct DetectionCache {
    store: Box<dyn EntryStore>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    expired_removed: AtomicU64,
    evicted: AtomicU64,
}

impl DetectionCache {
    /// Open the durable cache, resolving the cache directory from `config`.
    pub fn open(config: CacheConfig) -> CacheResult<Self> {
        let dir = config.resolve_cache_dir().map_err(|e| CacheError::Io {
            message: e.to_string(),
        })?;
        let store = SqliteStore::open(&dir.join(CACHE_FILE_NAME))?;
        Ok(Self::with_store(Box::new(store), config))
    }

    /// Process-local cache with no backing file.
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::with_store(Box::new(MemoryStore::new()), config)
    }

    pub fn with_store(store: Box<dyn EntryStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired_removed: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Deterministic key for a (database, schema, options) triple.
    /// See [`keys::generate_key`].
    pub fn generate_key(
        &self,
        identity: &DatabaseIdentity,
        schema_hash: &str,
        options: &DetectionConfig,
    ) -> CacheResult<String> {
        keys::generate_key(identity, schema_hash, options)
    }

    /// Cache a detection result under `key`.
    ///
    /// Returns whether the entry was written. Results below the configured
    /// confidence floor are skipped; expired entries are swept and size
    /// bounds enforced before the write. Backend failures degrade to
    /// `false` with a logged warning.
    pub fn store(
        &self,
        key: &str,
        identity: &DatabaseIdentity,
        schema_hash: &str,
        results: &EvidenceAnalysisResult,
        auto_configuration: Option<serde_json::Value>,
        ttl_ms: Option<u64>,
    ) -> bool {
        match self.try_store(key, identity, schema_hash, results, auto_configuration, ttl_ms) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("{}", e.log_string());
                false
            }
        }
    }

    /// Look up a cached result, revalidating it before returning.
    ///
    /// Checks, in order: engine version (always), TTL and schema
    /// fingerprint (per the invalidation strategy), and database identity
    /// when the caller supplies one. Any failed check deletes the stale
    /// entry and reports a miss, as does a corrupt or unreadable entry.
    /// A hit updates the entry's access bookkeeping in place.
    pub fn retrieve(
        &self,
        key: &str,
        identity: Option<&DatabaseIdentity>,
        schema_hash: Option<&str>,
    ) -> Option<DetectionCacheEntry> {
        let found = match self.try_retrieve(key, identity, schema_hash) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("{}", e.log_string());
                None
            }
        };
        match found {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Delete every entry past its TTL. Unreadable entries count as
    /// expired. Returns the number removed.
    pub fn cleanup_expired_entries(&self) -> usize {
        match self.try_cleanup_expired() {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("{}", e.log_string());
                0
            }
        }
    }

    /// Evict least-used entries until both the size and count bounds hold.
    /// Returns the number evicted.
    pub fn enforce_max_size(&self) -> usize {
        match self.try_enforce_max_size() {
            Ok(evicted) => evicted,
            Err(e) => {
                tracing::warn!("{}", e.log_string());
                0
            }
        }
    }

    pub fn get_statistics(&self) -> CacheStatistics {
        match self.try_get_statistics() {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("{}", e.log_string());
                CacheStatistics::default()
            }
        }
    }

    /// Drop every entry. Returns whether the clear succeeded.
    pub fn clear(&self) -> bool {
        match self.store.clear() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{}", e.log_string());
                false
            }
        }
    }

    /// Delete a single entry. Returns whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        match self.store.delete(key) {
            Ok(existed) => existed,
            Err(e) => {
                tracing::warn!("{}", e.log_string());
                false
            }
        }
    }

    fn try_store(
        &self,
        key: &str,
        identity: &DatabaseIdentity,
        schema_hash: &str,
        results: &EvidenceAnalysisResult,
        auto_configuration: Option<serde_json::Value>,
        ttl_ms: Option<u64>,
    ) -> CacheResult<bool> {
        let threshold = self.config.effective_min_confidence_to_cache();
        if results.overall_confidence < threshold {
            tracing::debug!(
                key,
                confidence = results.overall_confidence,
                threshold,
                "Result below cache confidence floor, not caching"
            );
            return Ok(false);
        }

        // Bring the cache within bounds before adding the new entry.
        self.try_cleanup_expired()?;
        self.try_enforce_max_size()?;

        let ttl = ttl_ms.unwrap_or_else(|| self.config.effective_default_ttl_ms());
        let entry = DetectionCacheEntry::new(
            key,
            identity.normalized(),
            schema_hash,
            results.clone(),
            auto_configuration,
            ttl,
            now_ms(),
        );
        let json = serde_json::to_string(&entry).map_err(|e| CacheError::Serialization {
            message: e.to_string(),
        })?;
        self.store.put(key, &json)?;
        tracing::debug!(key, ttl_ms = ttl, "Cached detection result");
        Ok(true)
    }

    fn try_retrieve(
        &self,
        key: &str,
        identity: Option<&DatabaseIdentity>,
        schema_hash: Option<&str>,
    ) -> CacheResult<Option<DetectionCacheEntry>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        let mut entry: DetectionCacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                let err = CacheError::CorruptEntry {
                    key: key.to_string(),
                    message: e.to_string(),
                };
                tracing::warn!("{}", err.log_string());
                self.store.delete(key)?;
                return Ok(None);
            }
        };
        if let Some(reason) = self.invalidation_reason(&entry, identity, schema_hash) {
            tracing::debug!(key, reason, "Cache entry no longer valid, discarding");
            self.store.delete(key)?;
            return Ok(None);
        }
        entry.touch(now_ms());
        let json = serde_json::to_string(&entry).map_err(|e| CacheError::Serialization {
            message: e.to_string(),
        })?;
        self.store.put(key, &json)?;
        Ok(Some(entry))
    }

    fn invalidation_reason(
        &self,
        entry: &DetectionCacheEntry,
        identity: Option<&DatabaseIdentity>,
        schema_hash: Option<&str>,
    ) -> Option<&'static str> {
        if entry.metadata.engine_version != ENGINE_VERSION {
            return Some("engine version changed");
        }
        let strategy = self.config.invalidation_strategy;
        if strategy.checks_ttl() && entry.is_expired(now_ms()) {
            return Some("ttl expired");
        }
        if let Some(identity) = identity {
            if identity.normalized() != entry.database_identity {
                return Some("database identity mismatch");
            }
        }
        if strategy.checks_schema() {
            if let Some(hash) = schema_hash {
                if hash != entry.schema_hash {
                    return Some("schema fingerprint changed");
                }
            }
        }
        None
    }

    fn try_cleanup_expired(&self) -> CacheResult<usize> {
        let now = now_ms();
        let mut removed = 0usize;
        for key in self.store.keys()? {
            let Some(raw) = self.store.get(&key)? else {
                continue;
            };
            let expired = match serde_json::from_str::<DetectionCacheEntry>(&raw) {
                Ok(entry) => entry.is_expired(now),
                // Unreadable entries are swept along with expired ones.
                Err(_) => true,
            };
            if expired && self.store.delete(&key)? {
                removed += 1;
            }
        }
        if removed > 0 {
            self.expired_removed.fetch_add(removed as u64, Ordering::Relaxed);
            tracing::debug!(removed, "Swept expired cache entries");
        }
        Ok(removed)
    }

    fn try_enforce_max_size(&self) -> CacheResult<usize> {
        let max_bytes = self.config.effective_max_cache_size_bytes();
        let max_entries = self.config.effective_max_entries();
        if self.within_bounds(max_bytes, max_entries)? {
            return Ok(0);
        }

        // Least-used first, oldest access breaking ties.
        let mut candidates: Vec<(String, u64, u64)> = Vec::new();
        for key in self.store.keys()? {
            let Some(raw) = self.store.get(&key)? else {
                continue;
            };
            let (access_count, last_accessed) =
                match serde_json::from_str::<DetectionCacheEntry>(&raw) {
                    Ok(entry) => (
                        entry.metadata.access_count,
                        entry.metadata.last_accessed_at_ms,
                    ),
                    Err(_) => (0, 0),
                };
            candidates.push((key, access_count, last_accessed));
        }
        candidates.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.cmp(&b.2)));

        let mut evicted = 0usize;
        for (key, _, _) in candidates {
            if self.within_bounds(max_bytes, max_entries)? {
                break;
            }
            if self.store.delete(&key)? {
                evicted += 1;
            }
        }
        if evicted > 0 {
            self.evicted.fetch_add(evicted as u64, Ordering::Relaxed);
            tracing::debug!(evicted, "Evicted cache entries to respect size bounds");
        }
        Ok(evicted)
    }

    fn within_bounds(&self, max_bytes: u64, max_entries: usize) -> CacheResult<bool> {
        Ok(self.store.total_size_bytes()? <= max_bytes && self.store.len()? <= max_entries)
    }

    fn try_get_statistics(&self) -> CacheResult<CacheStatistics> {
        let now = now_ms();
        let mut expired = 0usize;
        let mut high_confidence = 0usize;
        for key in self.store.keys()? {
            let Some(raw) = self.store.get(&key)? else {
                continue;
            };
            match serde_json::from_str::<DetectionCacheEntry>(&raw) {
                Ok(entry) => {
                    if entry.is_expired(now) {
                        expired += 1;
                    }
                    if entry.metadata.confidence_level == ConfidenceLevel::High {
                        high_confidence += 1;
                    }
                }
                Err(_) => expired += 1,
            }
        }
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        Ok(CacheStatistics {
            entry_count: self.store.len()?,
            total_size_bytes: self.store.total_size_bytes()?,
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
            expired_entries: expired,
            high_confidence_entries: high_confidence,
            expired_removed: self.expired_removed.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        })
    }
}
