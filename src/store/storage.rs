//! The key-value persistence layer underneath the transaction store and the session.

use crate::{utils, Result};
use anyhow::bail;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Key under which the session flag is persisted.
pub const AUTH_KEY: &str = "biblio_auth";

/// Key under which the JSON transaction snapshot is persisted.
pub const TRANSACTIONS_KEY: &str = "biblio_transactions";

/// A very small string-keyed store. Values are whole documents; there is no partial update.
#[async_trait::async_trait]
pub trait Storage {
    /// Returns the value under `key`, or `None` if nothing has been stored there.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value under `key`.
    async fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes the value under `key`. Removing a missing key is not an error.
    async fn remove(&mut self, key: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// `dir` must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file that holds `key`.
    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait::async_trait]
impl Storage for FileStorage {
    /// A file that is not valid UTF-8 is returned with the invalid sequences replaced, so that
    /// callers see it as unparseable content rather than as a storage failure.
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = utils::read_bytes(&path).await?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                warn!("The value stored under '{key}' is not valid UTF-8: {e}");
                Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        }
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        utils::write_atomic(self.path(key), value).await
    }

    async fn remove(&mut self, key: &str) -> Result<()> {
        utils::remove(&self.path(key)).await
    }
}

/// An in-memory `Storage` for tests. Clones share the same data, so a test can keep a handle
/// and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `MemoryStorage` with `value` already stored under `key`.
    pub fn with(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.insert(key, value);
        storage
    }

    /// Stores a value without going through the `Storage` trait.
    pub fn insert(&self, key: &str, value: &str) {
        if let Ok(mut data) = self.data.lock() {
            data.insert(key.to_string(), value.to_string());
        }
    }

    /// Reads a value without going through the `Storage` trait.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.data.lock().ok().and_then(|d| d.get(key).cloned())
    }

    /// While `fail` is true every `set` returns an error, like a full browser quota.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.peek(key))
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("Storage quota exceeded while writing '{key}'");
        }
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&mut self, key: &str) -> Result<()> {
        if let Ok(mut data) = self.data.lock() {
            data.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_storage_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path());
        assert_eq!(storage.get(AUTH_KEY).await.unwrap(), None);

        storage.set(AUTH_KEY, "true").await.unwrap();
        assert_eq!(storage.get(AUTH_KEY).await.unwrap().as_deref(), Some("true"));
        assert!(dir.path().join("biblio_auth.json").is_file());

        storage.remove(AUTH_KEY).await.unwrap();
        assert_eq!(storage.get(AUTH_KEY).await.unwrap(), None);
        storage.remove(AUTH_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_reads_invalid_utf8_as_text() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(storage.path(TRANSACTIONS_KEY), [0xff, 0xfe, b'[']).unwrap();
        let text = storage.get(TRANSACTIONS_KEY).await.unwrap().unwrap();
        assert_eq!(text, "\u{fffd}\u{fffd}[");
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_data() {
        let handle = MemoryStorage::new();
        let mut storage = handle.clone();
        storage.set(TRANSACTIONS_KEY, "[]").await.unwrap();
        assert_eq!(handle.peek(TRANSACTIONS_KEY).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_memory_storage_write_failure() {
        let mut storage = MemoryStorage::with(TRANSACTIONS_KEY, "[]");
        storage.fail_writes(true);
        assert!(storage.set(TRANSACTIONS_KEY, "[{}]").await.is_err());
        assert_eq!(storage.peek(TRANSACTIONS_KEY).as_deref(), Some("[]"));
    }
}
