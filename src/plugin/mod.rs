//! The event router: maps typed agent messages to repository operations.
//!
//! [`VcDataManagement`] is the plugin surface the agent framework talks to.
//! Each recognized message type triggers exactly one repository call; read
//! results are reshaped into display projections (see [`attestation`]) and
//! handed to the caller's callback. Unrecognized types pass through as
//! [`EventStatus::Ignored`].

pub mod attestation;

pub use attestation::{Attestation, Attestor, UlaResponse, UlaTransaction};

use std::sync::Arc;

use log::debug;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DataError;
use crate::model::{Address, VcTransaction, VerifiableCredential};
use crate::repository::{
    AddressRepository, VcTransactionRepository, VerifiableCredentialRepository,
};
use crate::storage::DataStorage;

/// An inbound agent message.
///
/// Messages are untyped on the wire; `properties` carries the payload and a
/// `type` tag selecting the operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Message payload, including the `type` tag.
    pub properties: Value,
}

impl Message {
    /// Wraps a payload in a message.
    #[must_use]
    pub const fn new(properties: Value) -> Self {
        Self { properties }
    }

    /// The message's type tag, when present and a string.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        self.properties.get("type").and_then(Value::as_str)
    }
}

/// The channel back into the agent framework.
///
/// The plugin holds it from [`VcDataManagement::initialize`] onward; this
/// plugin never dispatches messages of its own, but refuses to handle
/// events until the channel exists, matching the framework's lifecycle.
pub trait EventHandler: Send + Sync {
    /// Feeds a message into the agent for other plugins to handle.
    ///
    /// # Errors
    ///
    /// Returns an error when no plugin could process the message.
    fn process_message(&self, message: &Message) -> Result<(), DataError>;
}

/// Outcome of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// The message type was recognized and the operation succeeded.
    Success,
    /// The message type is not for this plugin; passed through untouched.
    Ignored,
}

/// Message types this plugin listens to.
const LISTENING_TO_TYPES: [&str; 11] = [
    "save-vcs",
    "get-vcs-by-context",
    "get-vcs-by-subject",
    "save-address",
    "save-vc-transaction",
    "get-address-details",
    "get-attestations",
    "get-attestors",
    "get-new-key-id",
    "data-clear-all",
    "get-transactions",
];

/// Credential data-management plugin.
///
/// Owns the three repositories and routes agent messages to them. All
/// repository errors, including validation and not-found, surface to the
/// caller of [`handle_event`](Self::handle_event) unchanged.
pub struct VcDataManagement {
    credential_repo: VerifiableCredentialRepository,
    address_repo: AddressRepository,
    transaction_repo: VcTransactionRepository,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl VcDataManagement {
    /// Creates the plugin over pre-built repositories.
    #[must_use]
    pub const fn new(
        credential_repo: VerifiableCredentialRepository,
        address_repo: AddressRepository,
        transaction_repo: VcTransactionRepository,
    ) -> Self {
        Self {
            credential_repo,
            address_repo,
            transaction_repo,
            event_handler: None,
        }
    }

    /// Creates the plugin with all three repositories sharing one storage
    /// port.
    #[must_use]
    pub fn from_storage(storage: Arc<dyn DataStorage>) -> Self {
        Self::new(
            VerifiableCredentialRepository::new(Arc::clone(&storage)),
            AddressRepository::new(Arc::clone(&storage)),
            VcTransactionRepository::new(storage),
        )
    }

    /// Plugin name, as registered with the agent framework.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "VerifiableCredentialDataManagement"
    }

    /// Attaches the agent channel. Must be called before the first
    /// recognized event arrives.
    pub fn initialize(&mut self, event_handler: Arc<dyn EventHandler>) {
        self.event_handler = Some(event_handler);
    }

    /// Handles one inbound message.
    ///
    /// Read operations hand their (reshaped) results to `callback`; write
    /// operations return with no callback invocation.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Uninitialized`] when a recognized type arrives
    /// before [`initialize`](Self::initialize); otherwise whatever the
    /// repository operation raises. Unrecognized types never fail.
    pub fn handle_event(
        &self,
        message: &Message,
        callback: &mut dyn FnMut(Value),
    ) -> Result<EventStatus, DataError> {
        let Some(message_type) = message.message_type() else {
            return Ok(EventStatus::Ignored);
        };
        if !LISTENING_TO_TYPES.contains(&message_type) {
            return Ok(EventStatus::Ignored);
        }
        if self.event_handler.is_none() {
            return Err(DataError::Uninitialized);
        }
        debug!("handling {message_type} event");

        match message_type {
            "save-vcs" => {
                let credentials: Vec<VerifiableCredential> =
                    property(message, "verifiableCredentials")?;
                self.credential_repo.save_multiple(&credentials)?;
            }
            "get-vcs-by-context" => {
                let pattern = context_regex(message)?;
                let result = self.credential_repo.find_by_context(&pattern)?;
                callback(serde_json::to_value(result)?);
            }
            "get-vcs-by-subject" => {
                let pattern = context_regex(message)?;
                let result = self.credential_repo.find_by_credential_subject(&pattern)?;
                callback(serde_json::to_value(result)?);
            }
            "save-address" => {
                let raw = raw_property(message, "address");
                let address = Address::try_from_value(raw)?;
                self.address_repo.save_one(&address)?;
            }
            "save-vc-transaction" => {
                let transaction: VcTransaction = property(message, "transaction")?;
                self.transaction_repo.save_one(&transaction)?;
            }
            "get-address-details" => {
                let public_address: String = property(message, "publicAddress")?;
                let details = self.address_repo.find_one_by_pub_address(&public_address)?;
                callback(serde_json::to_value(details)?);
            }
            "get-new-key-id" => {
                let highest_key_id = self
                    .address_repo
                    .find_all()?
                    .iter()
                    .map(Address::key_id)
                    .max()
                    .unwrap_or(0);
                callback(Value::from(highest_key_id + 1));
            }
            "get-attestations" => {
                let attestations = self
                    .credential_repo
                    .find_all()?
                    .iter()
                    .map(Attestation::from_credential)
                    .collect::<Result<Vec<_>, _>>()?;
                respond(callback, serde_json::to_value(attestations)?)?;
            }
            "get-attestors" => {
                let mut attestors: Vec<Attestor> = Vec::new();
                for credential in self.credential_repo.find_all()? {
                    let attestor = self.extract_attestor(&credential)?;
                    if attestors.iter().all(|known| known.pub_key != attestor.pub_key) {
                        attestors.push(attestor);
                    }
                }
                respond(callback, serde_json::to_value(attestors)?)?;
            }
            "data-clear-all" => {
                // Transactions are intentionally kept: the log outlives a
                // wallet reset.
                self.credential_repo.clear_all()?;
                self.address_repo.clear_all()?;
            }
            "get-transactions" => {
                let transactions = self
                    .transaction_repo
                    .find_all()?
                    .iter()
                    .map(|transaction| self.transform_transaction(transaction))
                    .collect::<Result<Vec<_>, _>>()?;
                respond(callback, serde_json::to_value(transactions)?)?;
            }
            _ => unreachable!("type was checked against LISTENING_TO_TYPES"),
        }

        Ok(EventStatus::Success)
    }

    /// Builds the attestor projection for a credential's issuer, including
    /// everything that issuer attested.
    fn extract_attestor(
        &self,
        credential: &VerifiableCredential,
    ) -> Result<Attestor, DataError> {
        let issued = self
            .credential_repo
            .find_by_issuer(&credential.issuer)?
            .iter()
            .map(Attestation::from_credential)
            .collect::<Result<Vec<_>, _>>()?;
        Attestor::from_credential(credential, issued)
    }

    /// Projects a stored transaction for display, resolving its issued and
    /// verified nonce lists back into attestations.
    fn transform_transaction(
        &self,
        transaction: &VcTransaction,
    ) -> Result<UlaTransaction, DataError> {
        let mut attest = Vec::with_capacity(transaction.issued_vcs.len());
        for nonce in &transaction.issued_vcs {
            let credential = self.credential_repo.find_one_by_nonce(nonce)?;
            attest.push(Attestation::from_credential(&credential)?);
        }
        let mut verify_request = Vec::with_capacity(transaction.verified_vcs.len());
        for nonce in &transaction.verified_vcs {
            let credential = self.credential_repo.find_one_by_nonce(nonce)?;
            verify_request.push(Attestation::from_credential(&credential)?);
        }
        let revoke = transaction
            .revoked_vcs
            .iter()
            .map(Attestation::from_credential)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UlaTransaction {
            uuid: transaction.uuid.clone(),
            attestor_pub_key: transaction.counterparty_id.clone(),
            datetime: transaction.created,
            attest,
            verify_request,
            revoke,
        })
    }
}

/// Wraps a result body in a 200 response and hands it to the callback.
fn respond(callback: &mut dyn FnMut(Value), body: Value) -> Result<(), DataError> {
    callback(serde_json::to_value(UlaResponse::ok(body))?);
    Ok(())
}

fn raw_property(message: &Message, field: &str) -> Value {
    message
        .properties
        .get(field)
        .cloned()
        .unwrap_or(Value::Null)
}

fn property<T: DeserializeOwned>(message: &Message, field: &str) -> Result<T, DataError> {
    Ok(serde_json::from_value(raw_property(message, field))?)
}

fn context_regex(message: &Message) -> Result<Regex, DataError> {
    let pattern: String = property(message, "contextRegex")?;
    Regex::new(&pattern).map_err(|err| DataError::InvalidPattern {
        reason: err.to_string(),
    })
}
