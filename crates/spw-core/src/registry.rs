//! # Write-Once Metadata Registry
//!
//! An append-only, ordered store of immutable declaration metadata, keyed
//! by a string. Each key can be written once; later writers for the same
//! key are rejected and the first entry stays. Readers take snapshots.
//!
//! ## Thread Safety
//!
//! Entries sit behind a `parking_lot::RwLock`. Registration takes the write
//! lock for the duplicate check and the append together, so concurrent
//! first-time registration of one key admits exactly one entry. Snapshots
//! clone `Arc`s under the read lock and never block each other.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, SpecwrightError};

/// Metadata that can be stored in a [`Registry`].
pub trait Keyed {
    /// Key the entry is registered under (usually a qualified name).
    fn registry_key(&self) -> &str;
}

/// Append-only, write-once-per-key registry.
#[derive(Debug)]
pub struct Registry<T> {
    name: String,
    entries: RwLock<Vec<Arc<T>>>,
}

impl<T: Keyed> Registry<T> {
    /// Create an empty registry. `name` appears in duplicate-key errors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// The registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns [`SpecwrightError::AlreadyRegistered`] if the key is taken;
    /// the registry is left unchanged.
    pub fn register(&self, entry: T) -> Result<Arc<T>> {
        let mut entries = self.entries.write();
        let key = entry.registry_key();
        if entries.iter().any(|e| e.registry_key() == key) {
            return Err(SpecwrightError::AlreadyRegistered {
                registry: self.name.clone(),
                key: key.to_string(),
            });
        }
        tracing::trace!(registry = %self.name, key, "registered entry");
        let entry = Arc::new(entry);
        entries.push(Arc::clone(&entry));
        Ok(entry)
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries
            .read()
            .iter()
            .find(|e| e.registry_key() == key)
            .cloned()
    }

    /// Whether an entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Copy of all entries in registration order.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.entries.read().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
