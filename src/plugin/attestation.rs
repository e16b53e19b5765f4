//! Display-oriented projections of stored records.
//!
//! The agent framework's UI layer consumes attestation-shaped records, not
//! raw credentials; these types and transforms reshape repository results
//! before they reach the caller's callback. They are pure mappings — all
//! invariants live in the models and repositories.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DataError;
use crate::model::{CredentialProof, VerifiableCredential};

/// Context used for attestations whose credential carried none.
const DEFAULT_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// A single attested claim set, shaped for display to the holder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    /// The proof nonce of the underlying credential.
    pub uuid: String,
    /// Verification method (public key) of the attestor.
    pub attestor_pub_key: String,
    /// Subject identifier, when the credential names one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub for_pub_key: Option<String>,
    /// Proof type tags.
    #[serde(rename = "type")]
    pub attestation_type: Vec<String>,
    /// Issuance datetime of the credential.
    pub datetime: DateTime<Utc>,
    /// Claim name (URL prefix stripped) to claim value.
    pub statements: Map<String, Value>,
    /// Context tags of the credential.
    pub context: Vec<String>,
}

impl Attestation {
    /// Projects a stored credential into its attestation shape.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the credential carries no proof;
    /// repositories never hand out such credentials, so this only fires
    /// for records that bypassed a repository.
    pub fn from_credential(credential: &VerifiableCredential) -> Result<Self, DataError> {
        let proof = credential_proof(credential)?;
        Ok(Self {
            uuid: proof.nonce.clone(),
            attestor_pub_key: proof.verification_method.clone(),
            for_pub_key: credential
                .credential_subject
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_owned),
            attestation_type: vec![proof.proof_type.clone()],
            datetime: credential.issuance_date,
            statements: statements_from_subject(&credential.credential_subject),
            context: credential
                .context
                .clone()
                .unwrap_or_else(|| vec![DEFAULT_CONTEXT.to_owned()]),
        })
    }
}

/// An attestor (issuer) with the attestations it issued to the holder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestor {
    /// Display name; "Unknown" when the credential carried none.
    pub name: String,
    /// Verification method (public key) of the attestor.
    pub pub_key: String,
    /// Issuance datetime of the credential the attestor was seen in.
    pub datetime: DateTime<Utc>,
    /// Display icon; "Unknown" when the credential carried none.
    pub icon: String,
    /// Transactions with this attestor; not tracked by this projection.
    pub transactions: Vec<UlaTransaction>,
    /// Attestations this attestor received; not tracked by this projection.
    pub received_attestations: Vec<Attestation>,
    /// Attestations issued by this attestor.
    pub issued_attestations: Vec<Attestation>,
}

impl Attestor {
    /// Builds an attestor from one of its credentials plus all attestations
    /// it issued.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the credential carries no proof.
    pub fn from_credential(
        credential: &VerifiableCredential,
        issued_attestations: Vec<Attestation>,
    ) -> Result<Self, DataError> {
        let proof = credential_proof(credential)?;
        Ok(Self {
            name: credential
                .additional_str("issuerName")
                .unwrap_or("Unknown")
                .to_owned(),
            pub_key: proof.verification_method.clone(),
            datetime: credential.issuance_date,
            icon: credential
                .additional_str("issuerIcon")
                .unwrap_or("Unknown")
                .to_owned(),
            transactions: Vec::new(),
            received_attestations: Vec::new(),
            issued_attestations,
        })
    }
}

/// A credential transaction, shaped for display to the holder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UlaTransaction {
    /// Transaction identifier.
    pub uuid: String,
    /// Public key of the counterparty.
    pub attestor_pub_key: String,
    /// When the transaction took place.
    pub datetime: DateTime<Utc>,
    /// Attestations issued during the transaction.
    pub attest: Vec<Attestation>,
    /// Attestations shared for verification during the transaction.
    pub verify_request: Vec<Attestation>,
    /// Attestations revoked during the transaction.
    pub revoke: Vec<Attestation>,
}

/// Response envelope handed to callbacks that expect an HTTP-like shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UlaResponse {
    /// HTTP-style status code.
    pub status_code: u16,
    /// Response payload.
    pub body: Value,
}

impl UlaResponse {
    /// Wraps `body` in a 200 response.
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }
}

fn credential_proof(credential: &VerifiableCredential) -> Result<&CredentialProof, DataError> {
    credential
        .proof
        .as_ref()
        .ok_or_else(|| DataError::validation("Verifiable credential does not contain a proof"))
}

/// Strips the URL part of every claim key (`http://schema.org/fullName`
/// becomes `fullName`) and drops the `id` entry, which names the subject
/// rather than stating a claim.
fn statements_from_subject(credential_subject: &Map<String, Value>) -> Map<String, Value> {
    let mut statements = Map::new();
    for (claim_key, claim_value) in credential_subject {
        let short_key = claim_key.rsplit('/').next().unwrap_or(claim_key.as_str());
        statements.insert(short_key.to_owned(), claim_value.clone());
    }
    statements.remove("id");
    statements
}
