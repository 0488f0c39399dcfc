//! Ordered, duplicate-free product list.

use std::fmt;

use tracing::{debug, warn};

use crate::consts::DEFAULT_PRODUCTS;
use crate::error::{CatalogError, InvalidInput, StoreError};
use crate::store::CatalogStore;

/// Trimmed, non-empty product name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductName(String);

impl ProductName {
    pub fn new(raw: &str) -> Result<Self, InvalidInput> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidInput::EMPTY_NAME);
        }
        Ok(ProductName(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCatalog {
    names: Vec<ProductName>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in fruit list used when nothing has been stored yet.
    pub fn with_defaults() -> Self {
        let names = DEFAULT_PRODUCTS
            .iter()
            .filter_map(|s| ProductName::new(s).ok())
            .collect();
        ProductCatalog { names }
    }

    /// Build from stored entries, skipping blanks and repeated names. Padded entries are trimmed.
    pub fn from_stored(raw: Vec<String>) -> Self {
        let mut catalog = ProductCatalog::new();
        for entry in raw {
            match ProductName::new(&entry) {
                Ok(name) if catalog.contains(name.as_str()) => {
                    warn!(product = %name, "skipping duplicate catalog entry");
                }
                Ok(name) => {
                    if name.as_str() != entry {
                        warn!(stored = %entry, product = %name, "trimmed whitespace around catalog entry");
                    }
                    catalog.names.push(name);
                }
                Err(_) => warn!("skipping blank catalog entry"),
            }
        }
        catalog
    }

    /// Load from `store`, falling back to the defaults when it is empty.
    pub fn open(store: &dyn CatalogStore) -> Result<Self, StoreError> {
        match store.load()? {
            Some(raw) => {
                debug!(entries = raw.len(), "loaded stored catalog");
                Ok(Self::from_stored(raw))
            }
            None => {
                debug!("no stored catalog, using defaults");
                Ok(Self::with_defaults())
            }
        }
    }

    pub fn names(&self) -> &[ProductName] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Case-sensitive exact match.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&ProductName> {
        self.position(name).map(|i| &self.names[i])
    }

    pub fn add(&mut self, raw: &str) -> Result<&ProductName, CatalogError> {
        let name = ProductName::new(raw)?;
        if self.contains(name.as_str()) {
            return Err(CatalogError::Duplicate(name.0));
        }
        self.names.push(name);
        Ok(&self.names[self.names.len() - 1])
    }

    /// Replace `old` in place. Renaming to an existing name (itself included) is a duplicate.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<&ProductName, CatalogError> {
        let index = self
            .position(old)
            .ok_or_else(|| CatalogError::NotFound(old.to_string()))?;
        let name = ProductName::new(new)?;
        if self.contains(name.as_str()) {
            return Err(CatalogError::Duplicate(name.0));
        }
        self.names[index] = name;
        Ok(&self.names[index])
    }

    pub fn remove(&mut self, name: &str) -> Result<ProductName, CatalogError> {
        let index = self
            .position(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        Ok(self.names.remove(index))
    }

    /// Case-insensitive substring filter, in catalog order.
    pub fn search(&self, filter: &str) -> Vec<&ProductName> {
        let needle = filter.to_lowercase();
        self.names
            .iter()
            .filter(|n| n.as_str().to_lowercase().contains(&needle))
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_str() == name)
    }
}
