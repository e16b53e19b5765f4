//! Derived address model.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Binds a public address to the account/key pair it was derived from and
/// the predicate it was generated for.
///
/// `account_id` and `key_id` are the HD-key path components used elsewhere
/// to re-derive the private key; the predicate is the claim type the address
/// answers for (e.g. `givenName`).
///
/// Construction validates that `address` and `predicate` are non-empty, and
/// the same check runs when decoding a stored value, so an invalid address
/// never materializes — not even from legacy data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AddressData")]
pub struct Address {
    address: String,
    account_id: u64,
    key_id: u64,
    predicate: String,
}

/// Raw deserialization shape; promoted to [`Address`] only after validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressData {
    address: String,
    account_id: u64,
    key_id: u64,
    predicate: String,
}

impl TryFrom<AddressData> for Address {
    type Error = DataError;

    fn try_from(data: AddressData) -> Result<Self, Self::Error> {
        Self::new(data.address, data.account_id, data.key_id, data.predicate)
    }
}

impl Address {
    /// Creates a validated address record.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `address` or `predicate` is empty.
    pub fn new<S: Into<String>, P: Into<String>>(
        address: S,
        account_id: u64,
        key_id: u64,
        predicate: P,
    ) -> Result<Self, DataError> {
        let address = address.into();
        let predicate = predicate.into();
        if address.is_empty() || predicate.is_empty() {
            return Err(DataError::validation("Address and/or predicate is empty"));
        }
        Ok(Self {
            address,
            account_id,
            key_id,
            predicate,
        })
    }

    /// Decodes an address record from an untyped value, re-raising the
    /// construction validation error for empty fields.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when `value` has the wrong shape and a
    /// validation error when `address` or `predicate` is empty.
    pub fn try_from_value(value: serde_json::Value) -> Result<Self, DataError> {
        let data: AddressData = serde_json::from_value(value)?;
        data.try_into()
    }

    /// The public address (like `0x58c1...`); the natural storage key.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The accountId part of the HD-key path.
    #[must_use]
    pub const fn account_id(&self) -> u64 {
        self.account_id
    }

    /// The keyId part of the HD-key path.
    #[must_use]
    pub const fn key_id(&self) -> u64 {
        self.key_id
    }

    /// The purpose this address was generated for.
    #[must_use]
    pub fn predicate(&self) -> &str {
        &self.predicate
    }
}
