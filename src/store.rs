//! Catalog persistence.
//!
//! The catalog is a JSON array of strings, rewritten in full after every
//! mutation. [`JsonFileStore`] keeps it in one file on disk; [`MemoryStore`]
//! keeps it in memory for tests.

use std::cell::RefCell;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::ProductName;
use crate::error::StoreError;

pub trait CatalogStore {
    /// `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<String>>, StoreError>;

    fn save(&self, names: &[ProductName]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

impl CatalogStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<String>>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        let names: Vec<String> = serde_json::from_str(&content)
            .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })?;
        Ok(Some(names))
    }

    fn save(&self, names: &[ProductName]) -> Result<(), StoreError> {
        let raw: Vec<&str> = names.iter().map(ProductName::as_str).collect();
        let json = serde_json::to_string_pretty(&raw)?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_err(e))?;

        // write beside the target, then rename over it
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.io_err(e))?;
        tmp.write_all(json.as_bytes()).map_err(|e| self.io_err(e))?;
        tmp.write_all(b"\n").map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;

        debug!(path = %self.path.display(), entries = names.len(), "catalog saved");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RefCell<Option<Vec<String>>>,
}

impl MemoryStore {
    pub fn with_names(names: Vec<String>) -> Self {
        MemoryStore { slot: RefCell::new(Some(names)) }
    }

    pub fn snapshot(&self) -> Option<Vec<String>> {
        self.slot.borrow().clone()
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, names: &[ProductName]) -> Result<(), StoreError> {
        let raw = names.iter().map(|n| n.as_str().to_string()).collect();
        *self.slot.borrow_mut() = Some(raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<ProductName> {
        raw.iter().map(|s| ProductName::new(s).unwrap()).collect()
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("products.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/products.json"));
        store.save(&names(&["Pear", "Apple 1kg", "تفاح"])).unwrap();

        assert_eq!(
            store.load().unwrap().unwrap(),
            vec!["Pear".to_string(), "Apple 1kg".into(), "تفاح".into()]
        );
    }

    #[test]
    fn empty_array_is_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        fs::write(&path, "[]").unwrap();
        assert_eq!(JsonFileStore::new(&path).load().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::new(&path).load(),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::default();
        assert!(store.load().unwrap().is_none());
        store.save(&names(&["Kiwi"])).unwrap();
        assert_eq!(store.snapshot(), Some(vec!["Kiwi".to_string()]));
    }
}
