//! Persistent key-value cache.
//!
//! The media resolver is the only client: it maps namespaced media keys to
//! the file node created for them. The cache must outlive a run, so the
//! production implementation is a SQLite file in the cache directory.

mod sqlite;

pub use sqlite::SqliteCache;

use serde_json::Value;

use crate::error::Result;

/// Key-value cache port.
///
/// Values are JSON documents. Implementations must be safe to share across
/// concurrent resolutions.
pub trait MediaCache: Send + Sync {
    /// Look up a key. `Ok(None)` on miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Insert or replace a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &Value) -> Result<()>;
}
