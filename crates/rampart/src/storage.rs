//! Durable local key-value storage.
//!
//! Mirrors the page's `localStorage`: string keys, string values, tolerant
//! of a missing or corrupt backing file.

use anyhow::{Context, Result};
use rampart_common::RampartError;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// String key-value store
pub trait KeyValueStore: Send {
    /// Returns `None` when the key is absent
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<(), RampartError>;
}

/// Volatile store, used in tests and for `--ephemeral` runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), RampartError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys in one JSON object on disk, rewritten on every `set`
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A file that is not a JSON object of strings is treated as empty and
    /// replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store {}", path.display()))?;

            match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Store file is malformed, starting empty"
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened local store");

        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), RampartError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| RampartError::Storage(e.to_string()))?;
        std::fs::write(&self.path, data)?;

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), RampartError> {
        self.entries.insert(key.to_string(), value);
        self.flush().inspect_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to write store");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("theme"), None);
        store.set("theme", "dark".into()).unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("formSubmissions", "[1,2,3]".into()).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("formSubmissions").as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_file_store_tolerates_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json at all").unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("formSubmissions"), None);

        store.set("theme", "light".into()).unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn test_file_store_write_failure_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();

        let mut store = JsonFileStore::open(blocker.join("store.json")).unwrap();
        let err = store.set("formSubmissions", "[]".into()).unwrap_err();
        assert!(matches!(err, RampartError::Storage(_)));
    }
}
