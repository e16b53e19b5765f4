//! Verifiable credential repository.

use std::sync::Arc;

use regex::Regex;

use crate::error::DataError;
use crate::model::VerifiableCredential;
use crate::storage::DataStorage;

use super::engine::{IndexedRepository, StoredRecord};

impl StoredRecord for VerifiableCredential {
    const INDEX_KEY: &'static str = "verifiable_credential";
    const NOT_FOUND_MESSAGE: &'static str = "No verifiable credential found";

    fn storage_key(&self) -> Result<String, DataError> {
        self.proof_nonce().map(str::to_owned).ok_or_else(|| {
            DataError::validation("Verifiable credential does not contain a proof")
        })
    }
}

/// Easy-to-use get/set access to stored verifiable credentials.
///
/// The storage key is the nonce from the credential's proof, so that needs
/// to be unique; saving a credential with an already-stored nonce
/// overwrites the previous one. The filter methods scan the whole
/// collection and match in memory — there is no secondary index.
pub struct VerifiableCredentialRepository {
    inner: IndexedRepository<VerifiableCredential>,
}

impl VerifiableCredentialRepository {
    /// Creates a repository over the given storage port.
    #[must_use]
    pub fn new(storage: Arc<dyn DataStorage>) -> Self {
        Self {
            inner: IndexedRepository::new(storage),
        }
    }

    /// Finds all stored credentials, in the order they were first saved.
    ///
    /// # Errors
    ///
    /// Returns storage and serialization failures unchanged.
    pub fn find_all(&self) -> Result<Vec<VerifiableCredential>, DataError> {
        self.inner.find_all()
    }

    /// Finds one credential by the nonce in its proof.
    ///
    /// # Errors
    ///
    /// Returns "No verifiable credential found" when nothing is stored
    /// under `nonce`, and a serialization error when the stored value is
    /// not a valid credential.
    pub fn find_one_by_nonce(&self, nonce: &str) -> Result<VerifiableCredential, DataError> {
        self.inner.find_one(nonce)
    }

    /// Finds the credentials whose issuer equals `issuer` exactly.
    ///
    /// # Errors
    ///
    /// Returns storage and serialization failures unchanged.
    pub fn find_by_issuer(&self, issuer: &str) -> Result<Vec<VerifiableCredential>, DataError> {
        self.inner
            .find_all_where(|vc| vc.issuer == issuer)
    }

    /// Finds the credentials with at least one context tag matching
    /// `context`.
    ///
    /// Credentials without a context are skipped. Case-insensitive matching
    /// is the caller's choice via an inline `(?i)` flag, e.g.
    /// `(?i)schema\.org/givenname`.
    ///
    /// # Errors
    ///
    /// Returns storage and serialization failures unchanged.
    pub fn find_by_context(&self, context: &Regex) -> Result<Vec<VerifiableCredential>, DataError> {
        self.inner.find_all_where(|vc| {
            vc.context
                .as_ref()
                .is_some_and(|tags| tags.iter().any(|tag| context.is_match(tag)))
        })
    }

    /// Finds the credentials with at least one credential-subject claim key
    /// matching `subject`.
    ///
    /// # Errors
    ///
    /// Returns storage and serialization failures unchanged.
    pub fn find_by_credential_subject(
        &self,
        subject: &Regex,
    ) -> Result<Vec<VerifiableCredential>, DataError> {
        self.inner.find_all_where(|vc| {
            vc.credential_subject
                .keys()
                .any(|claim| subject.is_match(claim))
        })
    }

    /// Saves one credential under its proof nonce, overwriting any
    /// previously stored credential with the same nonce.
    ///
    /// # Errors
    ///
    /// Returns "Verifiable credential does not contain a proof" — before
    /// any storage write — when the proof or nonce is missing.
    pub fn save_one(&self, credential: &VerifiableCredential) -> Result<(), DataError> {
        self.inner.save_one(credential)
    }

    /// Saves credentials sequentially, in input order.
    ///
    /// # Errors
    ///
    /// Returns the first per-credential failure; earlier credentials stay
    /// persisted, later ones are not attempted.
    pub fn save_multiple(&self, credentials: &[VerifiableCredential]) -> Result<(), DataError> {
        self.inner.save_multiple(credentials)
    }

    /// Removes all stored credentials, including the index.
    ///
    /// # Errors
    ///
    /// Returns storage failures unchanged.
    pub fn clear_all(&self) -> Result<(), DataError> {
        self.inner.clear_all()
    }
}
