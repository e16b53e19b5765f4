//! Credential transaction repository.

use std::sync::Arc;

use crate::error::DataError;
use crate::model::VcTransaction;
use crate::storage::DataStorage;

use super::engine::{IndexedRepository, StoredRecord};

impl StoredRecord for VcTransaction {
    const INDEX_KEY: &'static str = "vc_transactions";
    const NOT_FOUND_MESSAGE: &'static str = "No transactions found";

    fn storage_key(&self) -> Result<String, DataError> {
        // Generated at construction when the initiator supplied none.
        Ok(self.uuid.clone())
    }
}

/// Easy-to-use get/set access to stored credential transactions.
pub struct VcTransactionRepository {
    inner: IndexedRepository<VcTransaction>,
}

impl VcTransactionRepository {
    /// Creates a repository over the given storage port.
    #[must_use]
    pub fn new(storage: Arc<dyn DataStorage>) -> Self {
        Self {
            inner: IndexedRepository::new(storage),
        }
    }

    /// Finds all stored transactions, in the order they were first saved.
    ///
    /// # Errors
    ///
    /// Returns storage and serialization failures unchanged.
    pub fn find_all(&self) -> Result<Vec<VcTransaction>, DataError> {
        self.inner.find_all()
    }

    /// Finds one transaction by its uuid.
    ///
    /// # Errors
    ///
    /// Returns "No transactions found" when nothing is stored under
    /// `uuid`, and a serialization error when the stored value is not a
    /// valid transaction.
    pub fn find_one_by_uuid(&self, uuid: &str) -> Result<VcTransaction, DataError> {
        self.inner.find_one(uuid)
    }

    /// Saves one transaction under its uuid, overwriting any previously
    /// stored transaction with the same uuid.
    ///
    /// # Errors
    ///
    /// Returns storage failures unchanged.
    pub fn save_one(&self, transaction: &VcTransaction) -> Result<(), DataError> {
        self.inner.save_one(transaction)
    }

    /// Removes all stored transactions, including the index.
    ///
    /// # Errors
    ///
    /// Returns storage failures unchanged.
    pub fn clear_all(&self) -> Result<(), DataError> {
        self.inner.clear_all()
    }
}
