//! Content-addressed backend boundary for the gateway ledger.
//!
//! Object payloads live in a remote content-addressed network. The ledger
//! only ever holds hashes; this crate defines how those hashes are resolved
//! to node descriptors and raw bytes.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{ContentError, ContentResult};
pub use memory::InMemoryContentBackend;
pub use traits::ContentBackend;
