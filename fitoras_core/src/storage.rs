//! Key-value persistence with file locking.
//!
//! Every store in the crate persists JSON values by `(partition, key)`.
//! `FileStore` keeps one file per key and replaces it atomically, so a
//! write is either fully visible or not at all (last write wins).

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Named storage partitions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    Exercises,
    Splits,
    Categories,
    Calendar,
    Settings,
}

impl Partition {
    pub fn as_str(self) -> &'static str {
        match self {
            Partition::Exercises => "exercises",
            Partition::Splits => "splits",
            Partition::Categories => "categories",
            Partition::Calendar => "calendar",
            Partition::Settings => "settings",
        }
    }
}

/// Get/put contract for JSON values
pub trait KeyValueStore: Send + Sync {
    fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>>;
    fn put(&self, partition: Partition, key: &str, value: &Value) -> Result<()>;
    /// Returns true if a value was removed
    fn remove(&self, partition: Partition, key: &str) -> Result<bool>;
}

/// Load and deserialize a value
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    partition: Partition,
    key: &str,
) -> Result<Option<T>> {
    match store.get(partition, key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and store a value
pub fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    partition: Partition,
    key: &str,
    value: &T,
) -> Result<()> {
    let value = serde_json::to_value(value)?;
    store.put(partition, key, &value)
}

// ============================================================================
// File-backed store
// ============================================================================

/// Directory-backed store: `root/<partition>/<key>.json`
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

/// Keys become file names, so only `[A-Za-z0-9_-]` is allowed
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, partition: Partition, key: &str) -> Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(Error::Storage(format!("invalid storage key '{}'", key)));
        }
        Ok(self
            .root
            .join(partition.as_str())
            .join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(partition, key)?;
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let value = serde_json::from_str(&contents)?;
        tracing::debug!("Read {:?}", path);
        Ok(Some(value))
    }

    /// Atomically writes the value by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn put(&self, partition: Partition, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(partition, key)?;
        let parent = path
            .parent()
            .ok_or_else(|| Error::Storage(format!("{:?} has no parent directory", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(value)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {:?}", path);
        Ok(())
    }

    fn remove(&self, partition: Partition, key: &str) -> Result<bool> {
        let path = self.path_for(partition, key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {:?}", path);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store, used by tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(Partition, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(Partition, String), Value>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>> {
        Ok(self.entries()?.get(&(partition, key.to_string())).cloned())
    }

    fn put(&self, partition: Partition, key: &str, value: &Value) -> Result<()> {
        self.entries()?
            .insert((partition, key.to_string()), value.clone());
        Ok(())
    }

    fn remove(&self, partition: Partition, key: &str) -> Result<bool> {
        Ok(self
            .entries()?
            .remove(&(partition, key.to_string()))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        store
            .put(Partition::Splits, "splits", &json!([{"id": "a"}]))
            .unwrap();

        let value = store.get(Partition::Splits, "splits").unwrap().unwrap();
        assert_eq!(value[0]["id"], "a");
        assert!(temp_dir.path().join("splits/splits.json").exists());
    }

    #[test]
    fn test_file_store_missing_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert!(store.get(Partition::Calendar, "completions").unwrap().is_none());
        assert!(!store.remove(Partition::Calendar, "completions").unwrap());
    }

    #[test]
    fn test_file_store_last_write_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.put(Partition::Settings, "theme", &json!({"a": 1, "b": 2})).unwrap();
        store.put(Partition::Settings, "theme", &json!({"c": 3})).unwrap();

        let value = store.get(Partition::Settings, "theme").unwrap().unwrap();
        assert_eq!(value, json!({"c": 3}));

        // No stray temp files left next to the value
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("settings"))
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        let result = store.put(Partition::Splits, "../escape", &json!(1));
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn test_corrupted_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        std::fs::create_dir_all(temp_dir.path().join("splits")).unwrap();
        std::fs::write(temp_dir.path().join("splits/splits.json"), "{ invalid json }").unwrap();

        assert!(matches!(
            store.get(Partition::Splits, "splits"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_memory_store_typed_helpers() {
        let store = MemoryStore::new();
        save_json(&store, Partition::Categories, "categories", &vec!["x", "y"]).unwrap();

        let loaded: Option<Vec<String>> =
            load_json(&store, Partition::Categories, "categories").unwrap();
        assert_eq!(loaded, Some(vec!["x".to_string(), "y".to_string()]));

        assert!(store.remove(Partition::Categories, "categories").unwrap());
        let gone: Option<Vec<String>> =
            load_json(&store, Partition::Categories, "categories").unwrap();
        assert!(gone.is_none());
    }
}
