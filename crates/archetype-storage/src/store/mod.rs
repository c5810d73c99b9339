//! Cache entry stores.
//!
//! A store is a flat key/value map holding serialized cache entries as JSON
//! strings. The cache layer owns all entry semantics (expiry, validation,
//! eviction); stores only persist bytes.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use archetype_core::errors::cache_error::CacheResult;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Backend for persisted cache entries.
///
/// Values are opaque JSON strings; the store never parses them.
pub trait EntryStore: Send + Sync {
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    fn put(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Returns whether the key existed.
    fn delete(&self, key: &str) -> CacheResult<bool>;

    fn keys(&self) -> CacheResult<Vec<String>>;

    fn len(&self) -> CacheResult<usize>;

    /// Total size of all stored values in bytes.
    fn total_size_bytes(&self) -> CacheResult<u64>;

    fn clear(&self) -> CacheResult<()>;
}

impl<S: EntryStore + ?Sized> EntryStore for Arc<S> {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> CacheResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        (**self).delete(key)
    }

    fn keys(&self) -> CacheResult<Vec<String>> {
        (**self).keys()
    }

    fn len(&self) -> CacheResult<usize> {
        (**self).len()
    }

    fn total_size_bytes(&self) -> CacheResult<u64> {
        (**self).total_size_bytes()
    }

    fn clear(&self) -> CacheResult<()> {
        (**self).clear()
    }
}
