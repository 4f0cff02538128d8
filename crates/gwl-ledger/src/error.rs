use gwl_content::ContentError;
use gwl_store::StoreError;
use gwl_types::TypeError;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("bucket does not exist: {0}")]
    BucketNotFound(String),

    #[error("bucket already exists: {0}")]
    BucketExists(String),

    #[error("invalid bucket name {name:?}: {reason}")]
    InvalidBucketName { name: String, reason: String },

    #[error("bucket is not empty: {0}")]
    BucketNotEmpty(String),

    #[error("invalid upload id: {0}")]
    InvalidUploadID(String),

    #[error("object not found: {bucket}/{object}")]
    ObjectNotFound { bucket: String, object: String },

    #[error("content backend call `{operation}` exceeded {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("metadata store error: {0}")]
    Store(#[from] StoreError),

    #[error("content backend error: {0}")]
    Content(#[from] ContentError),

    #[error("record codec error: {0}")]
    Codec(#[from] TypeError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("ledger lock table poisoned")]
    LockPoisoned,
}

impl LedgerError {
    /// Returns `true` for the "no such bucket / object / upload" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BucketNotFound(_) | Self::InvalidUploadID(_) | Self::ObjectNotFound { .. }
        )
    }

    pub fn is_invalid_upload(&self) -> bool {
        matches!(self, Self::InvalidUploadID(_))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
