use thiserror::Error;

/// Errors produced by record encoding and decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("failed to encode {kind}: {reason}")]
    Encode { kind: &'static str, reason: String },

    #[error("failed to decode {kind}: {reason}")]
    Decode { kind: &'static str, reason: String },
}
