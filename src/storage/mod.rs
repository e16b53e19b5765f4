//! The storage port: a generic key-value contract the repositories build on.
//!
//! The backing medium is provided by the embedding application — browser
//! local storage, an encrypted file, a database table. The repositories only
//! require get/set/remove by string key; enumeration is handled above this
//! layer by keeping an index record per collection.
//!
//! See [`MemoryDataStorage`] for an in-memory implementation suitable for
//! tests and prototyping.

pub mod memory;

pub use memory::MemoryDataStorage;

use serde_json::Value;
use thiserror::Error;

/// An error raised by the storage collaborator.
///
/// The repository layer never retries or rewraps these; whatever the backend
/// reports travels up to the caller as-is.
#[derive(Debug, Error)]
#[error("storage backend error: {message}")]
pub struct StorageError {
    /// Backend-supplied failure description.
    pub message: String,
}

impl StorageError {
    /// Creates a storage error from a backend failure description.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Generic key-value data storage.
///
/// Implementations must satisfy three contract points:
///
/// - [`get`](DataStorage::get) returns `Ok(None)` for an absent key, never
///   an error;
/// - [`set`](DataStorage::set) overwrites unconditionally;
/// - [`remove`](DataStorage::remove) is a no-op for an absent key.
///
/// Values are JSON documents; each repository owns the shape of the values
/// it writes and re-validates them on the way back out.
pub trait DataStorage: Send + Sync {
    /// Gets the value stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backend itself fails (I/O, quota),
    /// never for a missing key.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Stores `value` under `key`, overwriting any prior value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend write fails.
    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Removes the value stored under `key`; no-op when absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend removal fails.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
