//! SQLite-backed entry store.
//!
//! A single database file with one key/value table. A format version lives
//! in a side table; when the on-disk layout changes between releases the
//! store wipes itself rather than attempting migration, since every entry
//! can be regenerated by re-running detection.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};

use archetype_core::errors::cache_error::{CacheError, CacheResult};

use super::EntryStore;

/// Bumped whenever the table layout changes; mismatched stores are cleared.
const STORE_FORMAT_VERSION: i32 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS detection_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

fn sqe(e: impl std::fmt::Display) -> CacheError {
    CacheError::Backend {
        message: e.to_string(),
    }
}

/// Durable store backed by a SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the store at `path`. Parent directories are created
    /// if missing.
    pub fn open(path: &Path) -> CacheResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                    message: format!("creating {}: {e}", parent.display()),
                })?;
            }
        }
        let conn = Connection::open(path).map_err(sqe)?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a transient store with no backing file.
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory().map_err(sqe)?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init(conn: &Connection) -> CacheResult<()> {
        conn.execute_batch(SCHEMA).map_err(sqe)?;
        if Self::read_format_version(conn)? != Some(STORE_FORMAT_VERSION) {
            conn.execute("DELETE FROM detection_cache", []).map_err(sqe)?;
            conn.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES ('format_version', ?1)",
                [STORE_FORMAT_VERSION.to_string()],
            )
            .map_err(sqe)?;
        }
        Ok(())
    }

    fn read_format_version(conn: &Connection) -> CacheResult<Option<i32>> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'format_version'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(sqe)?;
        Ok(raw.and_then(|v| v.parse().ok()))
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| CacheError::Backend {
            message: format!("sqlite store lock poisoned: {e}"),
        })
    }
}

impl EntryStore for SqliteStore {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.lock()?
            .query_row(
                "SELECT value FROM detection_cache WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(sqe)
    }

    fn put(&self, key: &str, value: &str) -> CacheResult<()> {
        self.lock()?
            .execute(
                "INSERT OR REPLACE INTO detection_cache (key, value) VALUES (?1, ?2)",
                [key, value],
            )
            .map_err(sqe)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        let changed = self
            .lock()?
            .execute("DELETE FROM detection_cache WHERE key = ?1", [key])
            .map_err(sqe)?;
        Ok(changed > 0)
    }

    fn keys(&self) -> CacheResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT key FROM detection_cache")
            .map_err(sqe)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(sqe)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(sqe)
    }

    fn len(&self) -> CacheResult<usize> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM detection_cache", [], |row| row.get(0))
            .map_err(sqe)?;
        Ok(count as usize)
    }

    fn total_size_bytes(&self) -> CacheResult<u64> {
        let size: i64 = self
            .lock()?
            .query_row(
                "SELECT COALESCE(SUM(LENGTH(value)), 0) FROM detection_cache",
                [],
                |row| row.get(0),
            )
            .map_err(sqe)?;
        Ok(size.max(0) as u64)
    }

    fn clear(&self) -> CacheResult<()> {
        self.lock()?
            .execute("DELETE FROM detection_cache", [])
            .map_err(sqe)?;
        Ok(())
    }
}
