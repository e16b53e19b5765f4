//! Indexed repositories over the storage port.
//!
//! All three repositories share one engine: member records live under their
//! natural keys, and a per-collection index record (a JSON array of member
//! keys under a fixed well-known key) makes enumeration and bulk deletion
//! possible on a backend that only supports get/set/remove.
//!
//! The engine is generic; the per-type modules bind it to a record model,
//! an index key and the type-specific lookups and filters.

mod address;
mod credential;
mod engine;
mod transaction;

pub use address::AddressRepository;
pub use credential::VerifiableCredentialRepository;
pub use engine::{IndexedRepository, StoredRecord};
pub use transaction::VcTransactionRepository;
