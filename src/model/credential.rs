//! Verifiable credential model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A W3C-shaped verifiable credential.
///
/// The credential is an immutable value object: it is created externally
/// (by an issuer flow), persisted as-is, and overwritten — never merged —
/// when re-saved under the same proof nonce.
///
/// `credential_subject` is an open map from claim key (usually a schema URL
/// such as `https://schema.org/givenName`) to claim value; the `id` entry,
/// when present, names the subject. Issuer-supplied extras like `issuerName`
/// and `issuerIcon` land in `additional_fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// JSON-LD context tags. Optional; credentials without a context are
    /// skipped by context filters rather than rejected.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<String>>,

    /// Credential identifier, when the issuer assigned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Credential type tags, e.g. `["VerifiableCredential"]`.
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub credential_type: Vec<String>,

    /// Issuer identifier (a DID or public key).
    pub issuer: String,

    /// When the credential was issued.
    pub issuance_date: DateTime<Utc>,

    /// Claim key to claim value; `id` names the subject.
    pub credential_subject: Map<String, Value>,

    /// Cryptographic proof. Absent only for credentials that were never
    /// completed by an issuer; such credentials cannot be saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<CredentialProof>,

    /// Issuer-supplied fields outside the core model (`issuerName`, ...).
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl VerifiableCredential {
    /// Returns the proof nonce, the credential's natural storage key.
    ///
    /// `None` when the proof is missing or its nonce is empty, in which
    /// case the credential is not persistable.
    #[must_use]
    pub fn proof_nonce(&self) -> Option<&str> {
        self.proof
            .as_ref()
            .map(|proof| proof.nonce.as_str())
            .filter(|nonce| !nonce.is_empty())
    }

    /// Looks up an additional string field, e.g. `issuerName`.
    #[must_use]
    pub fn additional_str(&self, field: &str) -> Option<&str> {
        self.additional_fields.get(field).and_then(Value::as_str)
    }
}

/// Proof substructure of a verifiable credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProof {
    /// Proof suite identifier.
    #[serde(rename = "type")]
    pub proof_type: String,

    /// When the proof was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Public key or verification method of the attestor.
    pub verification_method: String,

    /// Unique nonce; doubles as the credential's storage key.
    #[serde(default)]
    pub nonce: String,

    /// Detached signature over the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_value: Option<String>,
}
