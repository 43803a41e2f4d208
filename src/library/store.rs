//! Key-value persistence of JSON objects.
//!
//! `update` shallow-merges a JSON object patch into the stored object: each
//! patch field overwrites the stored one, and a `null` field deletes it.
//! A missing entry is created from the patch.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot encode record for {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Patch for {key:?} must be a JSON object")]
    NotAnObject { key: String },
}

/// Session-boundary persistence used by the reader and the library.
pub trait PersistenceStore: Send {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Merge `patch` into the entry at `key` and return the merged entry.
    fn update(&mut self, key: &str, patch: Value) -> Result<Value, StoreError>;

    /// Delete the entry at `key`, returning it.
    fn remove(&mut self, key: &str) -> Result<Option<Value>, StoreError>;

    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

fn merge_into(entries: &mut Map<String, Value>, key: &str, patch: Value) -> Result<Value, StoreError> {
    let Value::Object(patch) = patch else {
        return Err(StoreError::NotAnObject { key: key.to_owned() });
    };

    let entry = entries
        .entry(key.to_owned())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(fields) = entry {
        for (field, value) in patch {
            if value.is_null() {
                fields.remove(&field);
            } else {
                fields.insert(field, value);
            }
        }
    }
    Ok(entry.clone())
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn update(&mut self, key: &str, patch: Value) -> Result<Value, StoreError> {
        merge_into(&mut self.entries, key, patch)
    }

    fn remove(&mut self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.remove(key))
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// Store backed by one pretty-printed JSON file, rewritten on every change.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| {
                StoreError::Malformed {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        log::debug!("store {}: {} entries", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StoreError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, content).map_err(io_err)
    }
}

impl PersistenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn update(&mut self, key: &str, patch: Value) -> Result<Value, StoreError> {
        let merged = merge_into(&mut self.entries, key, patch)?;
        self.flush()?;
        Ok(merged)
    }

    fn remove(&mut self, key: &str) -> Result<Option<Value>, StoreError> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.flush()?;
        }
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn update_merges_shallowly() {
        let mut store = MemoryStore::new();
        store
            .update("book", json!({"title": "A", "position": {"index": 1}}))
            .unwrap();
        let merged = store
            .update("book", json!({"position": {"line": "x"}}))
            .unwrap();

        assert_eq!(merged, json!({"title": "A", "position": {"line": "x"}}));
    }

    #[test]
    fn null_field_deletes() {
        let mut store = MemoryStore::new();
        store.update("k", json!({"a": 1, "b": 2})).unwrap();
        store.update("k", json!({"a": null})).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!({"b": 2})));
    }

    #[test]
    fn non_object_patch_is_rejected() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.update("k", json!(3)),
            Err(StoreError::NotAnObject { .. })
        ));
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("library.json");

        let mut store = JsonFileStore::open(&path).expect("open missing");
        assert!(store.keys().unwrap().is_empty());
        store.update("abc", json!({"title": "第一卷"})).unwrap();
        store.update("def", json!({"title": "第二卷"})).unwrap();
        store.remove("def").unwrap();

        let reopened = JsonFileStore::open(&path).expect("reopen");
        assert_eq!(reopened.keys().unwrap(), vec!["abc".to_string()]);
        assert_eq!(
            reopened.get("abc").unwrap(),
            Some(json!({"title": "第一卷"}))
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Malformed { .. })
        ));
    }
}
