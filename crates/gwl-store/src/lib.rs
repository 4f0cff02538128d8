//! Durable metadata store adapter for the gateway ledger.
//!
//! The ledger persists bucket and multipart-upload records in a namespaced
//! key-value store. This crate defines the store boundary and the key
//! layout; the actual transport to a durable store lives behind
//! [`MetadataStore`] implementations.
//!
//! # Storage Backends
//!
//! - [`InMemoryMetadataStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`Namespaced`] -- wraps any store and prefixes every key
//!
//! # Design Rules
//!
//! 1. Absence is not failure: a missing key reads as `Ok(None)`.
//! 2. Writes are last-writer-wins at the key level.
//! 3. All backend errors are propagated, never silently ignored.

pub mod error;
pub mod key;
pub mod memory;
pub mod namespace;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use key::Key;
pub use memory::InMemoryMetadataStore;
pub use namespace::Namespaced;
pub use traits::MetadataStore;
