//! Metadata ledger for an object-storage gateway.
//!
//! The ledger tracks which buckets exist, which objects they contain (as
//! content-hash references), and which multipart uploads are in flight. It
//! mediates every read and write between three tiers:
//!
//! - an in-memory cache, filled lazily and kept for the ledger's lifetime;
//! - a durable [`MetadataStore`](gwl_store::MetadataStore) holding bucket
//!   and upload records;
//! - a [`ContentBackend`](gwl_content::ContentBackend) holding object bytes.
//!
//! [`Ledger`] is the only entry point. Operations on different buckets or
//! different upload ids run in parallel; operations on the same bucket or
//! upload id are serialized.

mod bucket;
pub mod config;
mod deadline;
pub mod error;
pub mod ledger;
mod locks;
pub mod multipart;
pub mod names;

pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use multipart::UploadGuard;
