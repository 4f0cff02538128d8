//! Record types for the gateway ledger (GWL).
//!
//! This crate provides the entity and serialization types shared by every
//! other GWL crate. Object payloads never pass through these types; objects
//! are represented purely as references to content hashes.
//!
//! # Key Types
//!
//! - [`BucketRecord`] — durable bucket record mapping object names to content hashes
//! - [`ObjectInfo`] — target descriptor (bucket + object name) of an upload
//! - [`ObjectPartInfo`] — one staged part of a multipart upload
//! - [`MultipartUpload`] — an in-flight multipart upload and its parts
//! - [`NodeDescriptor`] — a content-backend node resolved from a hash
//! - [`Record`] — deterministic binary codec implemented by persisted records

pub mod bucket;
pub mod codec;
pub mod error;
pub mod hash;
pub mod multipart;
pub mod node;

pub use bucket::BucketRecord;
pub use codec::Record;
pub use error::TypeError;
pub use hash::content_hash;
pub use multipart::{MultipartUpload, ObjectInfo, ObjectPartInfo};
pub use node::NodeDescriptor;
