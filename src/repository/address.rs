//! Derived address repository.

use std::sync::Arc;

use crate::error::DataError;
use crate::model::Address;
use crate::storage::DataStorage;

use super::engine::{IndexedRepository, StoredRecord};

impl StoredRecord for Address {
    const INDEX_KEY: &'static str = "address";
    const NOT_FOUND_MESSAGE: &'static str = "No address details found";

    fn storage_key(&self) -> Result<String, DataError> {
        // Non-empty by the model's construction invariant.
        Ok(self.address().to_owned())
    }
}

/// Keeps track of generated addresses.
///
/// Every address is derived from an accountId/keyId pair and bound to a
/// predicate; the public address string is the storage key. Re-saving an
/// existing address overwrites all its details.
pub struct AddressRepository {
    inner: IndexedRepository<Address>,
}

impl AddressRepository {
    /// Creates a repository over the given storage port.
    #[must_use]
    pub fn new(storage: Arc<dyn DataStorage>) -> Self {
        Self {
            inner: IndexedRepository::new(storage),
        }
    }

    /// Finds all stored addresses, in the order they were first saved.
    ///
    /// # Errors
    ///
    /// Returns storage and serialization failures unchanged.
    pub fn find_all(&self) -> Result<Vec<Address>, DataError> {
        self.inner.find_all()
    }

    /// Finds the details (accountId, keyId, predicate) of one address by
    /// its public `0x` address string.
    ///
    /// # Errors
    ///
    /// Returns "No address details found" when nothing is stored under
    /// `address`, and a validation or serialization error when the stored
    /// value is not a valid address record.
    pub fn find_one_by_pub_address(&self, address: &str) -> Result<Address, DataError> {
        self.inner.find_one(address)
    }

    /// Saves one address under its public address string.
    ///
    /// # Errors
    ///
    /// Returns storage failures unchanged.
    pub fn save_one(&self, address: &Address) -> Result<(), DataError> {
        self.inner.save_one(address)
    }

    /// Removes all stored addresses, including the index.
    ///
    /// # Errors
    ///
    /// Returns storage failures unchanged.
    pub fn clear_all(&self) -> Result<(), DataError> {
        self.inner.clear_all()
    }
}
