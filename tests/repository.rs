//! Integration tests for the indexed repositories.

use std::sync::Arc;

use regex::Regex;
use serde_json::json;
use vc_data_management::model::{Address, VcTransaction, VerifiableCredential};
use vc_data_management::repository::{
    AddressRepository, VcTransactionRepository, VerifiableCredentialRepository,
};
use vc_data_management::storage::{DataStorage, MemoryDataStorage};
use vc_data_management::DataError;

fn credential(nonce: &str, issuer: &str, contexts: Option<&[&str]>) -> VerifiableCredential {
    let mut raw = json!({
        "type": ["VerifiableCredential"],
        "issuer": issuer,
        "issuanceDate": "2019-03-01T10:00:00Z",
        "credentialSubject": {
            "id": "did:eth:0xsubject",
            "https://schema.org/givenName": "Tom"
        },
        "proof": {
            "type": "secp256k1Signature2019",
            "verificationMethod": "0xattestor",
            "nonce": nonce
        }
    });
    if let Some(contexts) = contexts {
        raw["@context"] = json!(contexts);
    }
    serde_json::from_value(raw).unwrap()
}

fn setup() -> (Arc<MemoryDataStorage>, VerifiableCredentialRepository) {
    let storage = Arc::new(MemoryDataStorage::new());
    let repo = VerifiableCredentialRepository::new(Arc::clone(&storage) as Arc<dyn DataStorage>);
    (storage, repo)
}

#[test]
fn save_and_find_all_preserves_save_order() {
    let (_, repo) = setup();
    let first = credential("nonce-1", "did:eth:0xa", None);
    let second = credential("nonce-2", "did:eth:0xb", None);
    repo.save_multiple(&[first.clone(), second.clone()]).unwrap();

    assert_eq!(repo.find_all().unwrap(), vec![first, second]);
}

#[test]
fn resaving_same_nonce_overwrites_without_duplicating() {
    let (storage, repo) = setup();
    repo.save_one(&credential("nonce-1", "did:eth:0xold", None))
        .unwrap();
    repo.save_one(&credential("nonce-1", "did:eth:0xnew", None))
        .unwrap();

    let all = repo.find_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].issuer, "did:eth:0xnew");
    // one member record plus the index record
    assert_eq!(storage.len(), 2);
}

#[test]
fn find_one_on_empty_store_reports_type_specific_message() {
    let (_, repo) = setup();
    let err = repo.find_one_by_nonce("anything").unwrap_err();
    assert_eq!(format!("{err}"), "No verifiable credential found");
}

#[test]
fn find_all_on_empty_store_is_empty_not_an_error() {
    let (_, repo) = setup();
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn saving_credential_without_proof_never_reaches_storage() {
    let (storage, repo) = setup();
    let mut vc = credential("nonce-1", "did:eth:0xa", None);
    vc.proof = None;

    let err = repo.save_one(&vc).unwrap_err();
    assert_eq!(
        format!("{err}"),
        "Verifiable credential does not contain a proof"
    );
    assert_eq!(storage.set_count(), 0);
}

#[test]
fn saving_credential_with_empty_nonce_is_rejected() {
    let (storage, repo) = setup();
    let mut vc = credential("nonce-1", "did:eth:0xa", None);
    vc.proof.as_mut().unwrap().nonce.clear();

    let err = repo.save_one(&vc).unwrap_err();
    assert!(matches!(err, DataError::Validation { .. }));
    assert_eq!(storage.set_count(), 0);
}

#[test]
fn find_by_context_matches_only_credentials_with_matching_tags() {
    let (_, repo) = setup();
    let given_name = credential(
        "nonce-1",
        "did:eth:0xa",
        Some(&["https://schema.org/givenName"]),
    );
    let family_name = credential(
        "nonce-2",
        "did:eth:0xa",
        Some(&["https://schema.org/familyName", "https://schema.org/address"]),
    );
    let no_context = credential("nonce-3", "did:eth:0xa", None);
    repo.save_multiple(&[given_name.clone(), family_name, no_context])
        .unwrap();

    let pattern = Regex::new(r"(?i)schema\.org/givenname").unwrap();
    assert_eq!(repo.find_by_context(&pattern).unwrap(), vec![given_name]);
}

#[test]
fn find_by_credential_subject_matches_claim_keys() {
    let (_, repo) = setup();
    repo.save_one(&credential("nonce-1", "did:eth:0xa", None))
        .unwrap();

    let pattern = Regex::new(r"(?i)schema\.org/givenname").unwrap();
    assert_eq!(repo.find_by_credential_subject(&pattern).unwrap().len(), 1);

    let pattern = Regex::new(r"(?i)schema\.org/familyname").unwrap();
    assert!(repo.find_by_credential_subject(&pattern).unwrap().is_empty());
}

#[test]
fn find_by_issuer_is_exact_match() {
    let (_, repo) = setup();
    repo.save_multiple(&[
        credential("nonce-1", "did:eth:0xa", None),
        credential("nonce-2", "did:eth:0xb", None),
        credential("nonce-3", "did:eth:0xa", None),
    ])
    .unwrap();

    let from_a = repo.find_by_issuer("did:eth:0xa").unwrap();
    assert_eq!(from_a.len(), 2);
    assert_eq!(from_a[0].proof_nonce(), Some("nonce-1"));
    assert_eq!(from_a[1].proof_nonce(), Some("nonce-3"));
    assert!(repo.find_by_issuer("did:eth:0xc").unwrap().is_empty());
}

#[test]
fn clear_all_removes_members_and_index_and_is_idempotent() {
    let (storage, repo) = setup();
    repo.save_multiple(&[
        credential("nonce-1", "did:eth:0xa", None),
        credential("nonce-2", "did:eth:0xa", None),
    ])
    .unwrap();

    repo.clear_all().unwrap();
    assert!(storage.is_empty());

    // second call degenerates to removing the absent index key
    repo.clear_all().unwrap();
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn malformed_stored_credential_propagates_as_serialization_error() {
    let (storage, repo) = setup();
    storage.set("bad-nonce", json!(42)).unwrap();
    let err = repo.find_one_by_nonce("bad-nonce").unwrap_err();
    assert!(matches!(err, DataError::Serialization(_)));
}

#[test]
fn address_repository_round_trip() {
    let storage: Arc<dyn DataStorage> = Arc::new(MemoryDataStorage::new());
    let repo = AddressRepository::new(storage);

    let first = Address::new("0xaaa", 0, 1, "givenName").unwrap();
    let second = Address::new("0xbbb", 0, 2, "familyName").unwrap();
    repo.save_one(&first).unwrap();
    repo.save_one(&second).unwrap();

    assert_eq!(repo.find_all().unwrap(), vec![first.clone(), second]);
    assert_eq!(repo.find_one_by_pub_address("0xaaa").unwrap(), first);

    let err = repo.find_one_by_pub_address("0xccc").unwrap_err();
    assert_eq!(format!("{err}"), "No address details found");
}

#[test]
fn transaction_repository_round_trip() {
    let storage: Arc<dyn DataStorage> = Arc::new(MemoryDataStorage::new());
    let repo = VcTransactionRepository::new(storage);

    let tx = VcTransaction::new("2019-05-01T12:34:00Z".parse().unwrap(), "0xissuer");
    repo.save_one(&tx).unwrap();

    assert_eq!(repo.find_one_by_uuid(&tx.uuid).unwrap(), tx);
    assert_eq!(repo.find_all().unwrap(), vec![tx]);

    let err = repo.find_one_by_uuid("missing").unwrap_err();
    assert_eq!(format!("{err}"), "No transactions found");
}

#[test]
fn collections_use_distinct_index_keys() {
    let storage = Arc::new(MemoryDataStorage::new());
    let vc_repo = VerifiableCredentialRepository::new(Arc::clone(&storage) as Arc<dyn DataStorage>);
    let addr_repo = AddressRepository::new(Arc::clone(&storage) as Arc<dyn DataStorage>);
    let tx_repo = VcTransactionRepository::new(Arc::clone(&storage) as Arc<dyn DataStorage>);

    vc_repo
        .save_one(&credential("nonce-1", "did:eth:0xa", None))
        .unwrap();
    addr_repo
        .save_one(&Address::new("0xaaa", 0, 1, "givenName").unwrap())
        .unwrap();
    tx_repo
        .save_one(&VcTransaction::new(
            "2019-05-01T12:34:00Z".parse().unwrap(),
            "0xissuer",
        ))
        .unwrap();

    // The documented well-known index keys, for compatibility with data
    // persisted by earlier deployments.
    let keys = storage.keys();
    assert!(keys.contains(&"verifiable_credential".to_owned()));
    assert!(keys.contains(&"address".to_owned()));
    assert!(keys.contains(&"vc_transactions".to_owned()));

    // Clearing one collection leaves the others alone.
    vc_repo.clear_all().unwrap();
    assert_eq!(addr_repo.find_all().unwrap().len(), 1);
    assert_eq!(tx_repo.find_all().unwrap().len(), 1);
}
