//! In-memory implementation of the storage port.
//!
//! Nothing here persists beyond the process; this store exists for unit and
//! integration testing of the repositories and for quick prototyping.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde_json::Value;

use super::{DataStorage, StorageError};

/// In-memory data storage backed by a `HashMap`.
///
/// Thread-safe. Counts `set` calls so tests can assert that validation
/// failures never reach the backend.
#[derive(Debug, Default)]
pub struct MemoryDataStorage {
    entries: RwLock<HashMap<String, Value>>,
    set_count: AtomicU64,
}

impl MemoryDataStorage {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Returns `true` when no entries are stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Returns all stored keys, in no particular order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().unwrap().keys().cloned().collect()
    }

    /// Removes every entry.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Returns how many times [`DataStorage::set`] has been called.
    #[must_use]
    pub fn set_count(&self) -> u64 {
        self.set_count.load(Ordering::Relaxed)
    }
}

impl DataStorage for MemoryDataStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.set_count.fetch_add(1, Ordering::Relaxed);
        self.entries.write().unwrap().insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}
