//! Credential transaction log model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::VerifiableCredential;

/// Outcome state of a credential transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    /// The transaction completed; the default when no state is recorded.
    #[default]
    Success,
    /// The transaction is still in flight.
    Pending,
    /// The transaction failed; see the record's error field.
    Error,
}

/// A data transaction: sharing or receiving credential(s) with a
/// counterparty.
///
/// The counterparty is the issuer when credentials were received, the
/// verifier when they were shared, and the issuer when both happened in one
/// exchange. The uuid is generated at construction when the initiator did
/// not supply one, and doubles as the storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcTransaction {
    /// When the transaction took place.
    pub created: DateTime<Utc>,

    /// Address or public key of the counterparty.
    pub counterparty_id: String,

    /// Transaction identifier (uuid v4); the natural storage key.
    #[serde(default = "generated_uuid")]
    pub uuid: String,

    /// Outcome state; `success` unless recorded otherwise.
    #[serde(default)]
    pub state: TransactionState,

    /// Error description or translatable key when `state` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Proof nonces of all credentials issued during this transaction.
    #[serde(default)]
    pub issued_vcs: Vec<String>,

    /// Proof nonces of all credentials shared during this transaction.
    #[serde(default)]
    pub verified_vcs: Vec<String>,

    /// Snapshots of all credentials revoked in this transaction.
    #[serde(default)]
    pub revoked_vcs: Vec<VerifiableCredential>,
}

fn generated_uuid() -> String {
    Uuid::new_v4().to_string()
}

impl VcTransaction {
    /// Creates a successful transaction with a fresh uuid and empty
    /// credential lists.
    #[must_use]
    pub fn new<S: Into<String>>(created: DateTime<Utc>, counterparty_id: S) -> Self {
        Self {
            created,
            counterparty_id: counterparty_id.into(),
            uuid: generated_uuid(),
            state: TransactionState::default(),
            error: None,
            issued_vcs: Vec::new(),
            verified_vcs: Vec::new(),
            revoked_vcs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults_applied_on_construction() {
        let tx = VcTransaction::new(Utc::now(), "0xcounterparty");
        assert_eq!(tx.state, TransactionState::Success);
        assert!(Uuid::parse_str(&tx.uuid).is_ok());
        assert!(tx.issued_vcs.is_empty());
        assert!(tx.verified_vcs.is_empty());
        assert!(tx.revoked_vcs.is_empty());
    }

    #[test]
    fn test_defaults_applied_on_deserialization() {
        let tx: VcTransaction = serde_json::from_value(json!({
            "created": "2019-05-01T12:34:00Z",
            "counterpartyId": "0xissuer"
        }))
        .unwrap();
        assert_eq!(tx.state, TransactionState::Success);
        assert!(Uuid::parse_str(&tx.uuid).is_ok());
    }

    #[test]
    fn test_fresh_uuid_per_transaction() {
        let a = VcTransaction::new(Utc::now(), "0xa");
        let b = VcTransaction::new(Utc::now(), "0xa");
        assert_ne!(a.uuid, b.uuid);
    }

    #[test]
    fn test_serialized_shape() {
        let mut tx = VcTransaction::new(Utc::now(), "0xverifier");
        tx.created = "2019-05-01T12:34:00Z".parse().unwrap();
        tx.uuid = "c12b4a42-0000-4000-8000-000000000000".to_owned();
        tx.verified_vcs.push("nonce-7".to_owned());

        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(
            value,
            json!({
                "created": "2019-05-01T12:34:00Z",
                "counterpartyId": "0xverifier",
                "uuid": "c12b4a42-0000-4000-8000-000000000000",
                "state": "success",
                "issuedVcs": [],
                "verifiedVcs": ["nonce-7"],
                "revokedVcs": []
            })
        );
        // `error` is omitted entirely while unset.
        assert!(value.get("error").is_none());

        tx.state = TransactionState::Error;
        tx.error = Some("connection dropped".to_owned());
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["state"], "error");
        assert_eq!(value["error"], "connection dropped");
    }

    #[test]
    fn test_round_trip() {
        let mut tx = VcTransaction::new(Utc::now(), "0xissuer");
        tx.issued_vcs.push("nonce-1".to_owned());
        let restored: VcTransaction =
            serde_json::from_value(serde_json::to_value(&tx).unwrap()).unwrap();
        assert_eq!(restored, tx);
    }
}
