/// Errors from content backend calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("content not found: {0}")]
    NotFound(String),

    #[error("content backend transport error: {0}")]
    Transport(String),

    #[error("corrupt node {hash}: {reason}")]
    Corrupt { hash: String, reason: String },
}

pub type ContentResult<T> = Result<T, ContentError>;
