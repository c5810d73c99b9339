//! Result cache configuration and invalidation strategy.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_TTL_MS, DEFAULT_MAX_CACHE_ENTRIES, DEFAULT_MAX_CACHE_SIZE_BYTES,
    DEFAULT_MIN_CONFIDENCE_TO_CACHE,
};
use crate::errors::config_error::{ConfigError, ConfigResult};

/// When a stored detection result stops being trusted.
///
/// An engine-version mismatch always invalidates, whatever the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationStrategy {
    /// TTL expiry only.
    Time,
    /// Schema fingerprint mismatch only; age is ignored.
    SchemaChange,
    /// Both TTL and schema fingerprint are checked.
    #[default]
    Hybrid,
}

impl InvalidationStrategy {
    pub fn checks_ttl(&self) -> bool {
        matches!(self, Self::Time | Self::Hybrid)
    }

    pub fn checks_schema(&self) -> bool {
        matches!(self, Self::SchemaChange | Self::Hybrid)
    }
}

/// Configuration for the detection result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory. When unset or unwritable, resolution falls back
    /// to the per-user cache location, then the system temp directory.
    pub cache_dir: Option<PathBuf>,
    /// Entry TTL in milliseconds. Default: 24 hours.
    pub default_ttl_ms: Option<u64>,
    /// Total size bound in bytes. Default: 50MB.
    pub max_cache_size_bytes: Option<u64>,
    /// Entry count bound. Default: 100.
    pub max_entries: Option<usize>,
    /// Invalidation strategy. Default: hybrid.
    pub invalidation_strategy: InvalidationStrategy,
    /// Results below this overall confidence are never cached. Default: 0.5.
    pub min_confidence_to_cache: Option<f64>,
}

impl CacheConfig {
    pub fn effective_default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms.unwrap_or(DEFAULT_CACHE_TTL_MS)
    }

    pub fn effective_max_cache_size_bytes(&self) -> u64 {
        self.max_cache_size_bytes
            .unwrap_or(DEFAULT_MAX_CACHE_SIZE_BYTES)
    }

    pub fn effective_max_entries(&self) -> usize {
        self.max_entries.unwrap_or(DEFAULT_MAX_CACHE_ENTRIES)
    }

    pub fn effective_min_confidence_to_cache(&self) -> f64 {
        self.min_confidence_to_cache
            .unwrap_or(DEFAULT_MIN_CONFIDENCE_TO_CACHE)
            .clamp(0.0, 1.0)
    }

    /// Resolve a writable cache directory, creating it if needed.
    ///
    /// Tries the configured directory, then the per-user cache location,
    /// then the system temp directory. Only when every candidate fails is
    /// the error fatal.
    pub fn resolve_cache_dir(&self) -> ConfigResult<PathBuf> {
        let mut attempted = Vec::new();
        for candidate in self.cache_dir_candidates() {
            match ensure_writable_dir(&candidate) {
                Ok(()) => {
                    if !attempted.is_empty() {
                        tracing::warn!(
                            dir = %candidate.display(),
                            "Using fallback cache directory"
                        );
                    }
                    return Ok(candidate);
                }
                Err(e) => {
                    tracing::warn!(
                        dir = %candidate.display(),
                        error = %e,
                        "Cache directory unusable, trying next candidate"
                    );
                    attempted.push(candidate.display().to_string());
                }
            }
        }
        Err(ConfigError::CacheDirUnavailable {
            attempted: attempted.join(", "),
        })
    }

    fn cache_dir_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = &self.cache_dir {
            candidates.push(dir.clone());
        }
        if let Some(base) = dirs::cache_dir() {
            candidates.push(base.join("archetype"));
        }
        candidates.push(std::env::temp_dir().join("archetype-cache"));
        candidates
    }
}

/// Create the directory and prove it is writable with a probe file.
fn ensure_writable_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let probe = dir.join(".write-probe");
    std::fs::write(&probe, b"ok")?;
    std::fs::remove_file(&probe)?;
    Ok(())
}
