#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

//! Data management for a credential wallet plugin.
//!
//! This crate stores and retrieves three record kinds — verifiable
//! credentials, derived addresses, and credential transactions — in a
//! generic key-value store, and exposes an event router that maps agent
//! messages to repository operations.
//!
//! # Architecture
//!
//! - [`storage`] — the storage port: a get/set/remove-by-key contract the
//!   embedding application implements (browser storage, a file, a
//!   database). An in-memory implementation ships for tests.
//! - [`repository`] — one generic indexed-repository engine, instantiated
//!   per record type. Each collection keeps an index record (ordered member
//!   keys under a fixed key) so "find all" and "clear all" work on a
//!   backend that only supports point lookups.
//! - [`model`] — the record value objects with their wire-compatible JSON
//!   shapes and construction-time validation.
//! - [`plugin`] — the [`VcDataManagement`] event router plus the display
//!   projections it hands to callbacks.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use vc_data_management::model::Address;
//! use vc_data_management::repository::AddressRepository;
//! use vc_data_management::storage::MemoryDataStorage;
//!
//! let storage = Arc::new(MemoryDataStorage::new());
//! let repo = AddressRepository::new(storage);
//!
//! let address = Address::new("0x58c1e9ca", 0, 1, "givenName")?;
//! repo.save_one(&address)?;
//! assert_eq!(repo.find_one_by_pub_address("0x58c1e9ca")?, address);
//! # Ok::<(), vc_data_management::DataError>(())
//! ```

mod error;
pub mod model;
pub mod plugin;
pub mod repository;
pub mod storage;

pub use error::DataError;
pub use plugin::{EventHandler, EventStatus, Message, VcDataManagement};
