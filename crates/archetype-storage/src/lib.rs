//! # archetype-storage
//!
//! Persisted cache for detection results. Derives deterministic cache keys
//! from database identity, schema fingerprint, and detection options;
//! stores entries in SQLite (or in memory); and revalidates them on read
//! against TTL, schema changes, and engine version per the configured
//! invalidation strategy.
//!
//! Cache failures never propagate to callers: a failed write means the
//! result is simply not cached, a failed read is a miss.

pub mod cache;
pub mod entry;
pub mod keys;
pub mod store;

pub use cache::{CacheStatistics, DetectionCache};
pub use entry::{CacheEntryMetadata, DetectionCacheEntry};
pub use keys::{generate_key, DatabaseIdentity};
pub use store::{EntryStore, MemoryStore, SqliteStore};
