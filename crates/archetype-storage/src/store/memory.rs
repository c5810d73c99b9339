//! In-memory entry store.

use std::sync::Mutex;
use std::sync::MutexGuard;

use archetype_core::errors::cache_error::{CacheError, CacheResult};
use archetype_core::FxHashMap;

use super::EntryStore;

/// Process-local store backed by a hash map. Used for tests and for
/// callers that want caching semantics without a database file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, FxHashMap<String, String>>> {
        self.entries.lock().map_err(|e| CacheError::Backend {
            message: format!("memory store lock poisoned: {e}"),
        })
    }
}

impl EntryStore for MemoryStore {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> CacheResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    fn keys(&self) -> CacheResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn len(&self) -> CacheResult<usize> {
        Ok(self.lock()?.len())
    }

    fn total_size_bytes(&self) -> CacheResult<u64> {
        Ok(self.lock()?.values().map(|v| v.len() as u64).sum())
    }

    fn clear(&self) -> CacheResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}
