//! Persistent artifact stores.
//!
//! The derivation fold can short-circuit per-node recomputation by consulting
//! an [`ArtifactStore`]: a keyed read-check-compute-write capability. I/O
//! failures are surfaced to the caller, never treated as a cache miss, so
//! storage corruption cannot silently degrade into recomputation.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::Error;

/// Keyed storage for derived artifacts.
pub trait ArtifactStore<V> {
    /// Whether an artifact for `id` is already persisted.
    fn has(&self, id: &str) -> Result<bool, Error>;

    /// Load the artifact persisted for `id`.
    fn load(&self, id: &str) -> Result<V, Error>;

    /// Persist the artifact derived for `id`.
    fn save(&mut self, id: &str, asset: &V) -> Result<(), Error>;
}

/// In-memory store, mainly for tests and intra-run reuse.
#[derive(Debug, Default)]
pub struct MemoryStore<V> {
    assets: HashMap<String, V>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        MemoryStore {
            assets: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, asset: V) {
        self.assets.insert(id.into(), asset);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl<V: Clone> ArtifactStore<V> for MemoryStore<V> {
    fn has(&self, id: &str) -> Result<bool, Error> {
        Ok(self.assets.contains_key(id))
    }

    fn load(&self, id: &str) -> Result<V, Error> {
        self.assets.get(id).cloned().ok_or_else(|| Error::Store {
            id: id.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "artifact not in store"),
        })
    }

    fn save(&mut self, id: &str, asset: &V) -> Result<(), Error> {
        self.assets.insert(id.to_string(), asset.clone());
        Ok(())
    }
}

/// Directory-backed store keeping one file per node id.
#[derive(Debug)]
pub struct FileStore {
    directory: PathBuf,
    extension: String,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        FileStore {
            directory: directory.into(),
            extension: extension.into(),
        }
    }

    fn path(&self, id: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", id, self.extension))
    }

    fn store_error(&self, id: &str, source: io::Error) -> Error {
        Error::Store {
            id: id.to_string(),
            source,
        }
    }
}

impl ArtifactStore<String> for FileStore {
    fn has(&self, id: &str) -> Result<bool, Error> {
        match fs::metadata(self.path(id)) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.store_error(id, e)),
        }
    }

    fn load(&self, id: &str) -> Result<String, Error> {
        fs::read_to_string(self.path(id)).map_err(|e| self.store_error(id, e))
    }

    fn save(&mut self, id: &str, asset: &String) -> Result<(), Error> {
        fs::write(self.path(id), asset).map_err(|e| self.store_error(id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(!store.has("A").unwrap());
        store.save("A", &"0.99".to_string()).unwrap();
        assert!(store.has("A").unwrap());
        assert_eq!(store.load("A").unwrap(), "0.99");
    }

    #[test]
    fn test_memory_store_load_missing() {
        let store: MemoryStore<String> = MemoryStore::new();
        assert!(matches!(store.load("A"), Err(Error::Store { .. })));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path(), "expr");
        assert!(!store.has("A").unwrap());
        store.save("A", &"(x * 0.99)".to_string()).unwrap();
        assert!(store.has("A").unwrap());
        assert_eq!(store.load("A").unwrap(), "(x * 0.99)");
        assert!(dir.path().join("A.expr").is_file());
    }

    #[test]
    fn test_file_store_save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nope"), "expr");
        let result = store.save("A", &"1.0".to_string());
        assert!(matches!(result, Err(Error::Store { ref id, .. }) if id == "A"));
    }

    #[test]
    fn test_file_store_load_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), "expr");
        assert!(matches!(store.load("A"), Err(Error::Store { .. })));
    }
}
