//! SQLite-backed media cache.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::MediaCache;
use crate::error::{Error, Result};

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS cache_entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// Key-value cache stored in a single SQLite table.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Open (or create) a cache database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or the
    /// schema cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory cache (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of cached entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn len(&self) -> Result<usize> {
        let count: i64 =
            self.conn()
                .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Whether the cache holds no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every entry. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<usize> {
        Ok(self.conn().execute("DELETE FROM cache_entries", [])?)
    }
}

impl MediaCache for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|s| serde_json::from_str(&s).map_err(Error::from))
            .transpose()
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        self.conn().execute(
            "INSERT INTO cache_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value.to_string(), now],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_missing_key() {
        let cache = SqliteCache::open_memory().unwrap();
        assert_eq!(cache.get("card-media-nope").unwrap(), None);
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_set_then_get() {
        let cache = SqliteCache::open_memory().unwrap();
        let value = json!({"file_node_id": "file_1"});

        cache.set("card-media-a", &value).unwrap();

        assert_eq!(cache.get("card-media-a").unwrap(), Some(value));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_set_replaces() {
        let cache = SqliteCache::open_memory().unwrap();

        cache.set("k", &json!(1)).unwrap();
        cache.set("k", &json!(2)).unwrap();

        assert_eq!(cache.get("k").unwrap(), Some(json!(2)));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = SqliteCache::open_memory().unwrap();
        cache.set("a", &json!("x")).unwrap();
        cache.set("b", &json!("y")).unwrap();

        assert_eq!(cache.clear().unwrap(), 2);
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        {
            let cache = SqliteCache::open(&path).unwrap();
            cache.set("card-media-1", &json!({"file_node_id": "f"})).unwrap();
        }

        let reopened = SqliteCache::open(&path).unwrap();
        assert_eq!(
            reopened.get("card-media-1").unwrap(),
            Some(json!({"file_node_id": "f"}))
        );
        assert_eq!(reopened.len().unwrap(), 1);
    }
}
