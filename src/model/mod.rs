//! Record models stored by the repositories.
//!
//! All three models serialize to the JSON shapes persisted by earlier
//! deployments of this plugin, so field names here are wire contracts, not
//! style choices.

mod address;
mod credential;
mod transaction;

pub use address::Address;
pub use credential::{CredentialProof, VerifiableCredential};
pub use transaction::{TransactionState, VcTransaction};
