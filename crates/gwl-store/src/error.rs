/// Errors from metadata store operations.
///
/// A missing key is not an error; see [`crate::MetadataStore::get`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected or failed the request.
    #[error("metadata store backend error: {0}")]
    Backend(String),

    /// The backend could not be reached.
    #[error("metadata store unavailable: {0}")]
    Unavailable(String),

    /// The key is not valid for this store.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("metadata store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
