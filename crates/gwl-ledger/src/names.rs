//! Validation of bucket names and upload ids.
//!
//! Both become a single segment of a metadata store key, so they must be
//! non-empty and must not contain `/`. Anything else is accepted as-is;
//! bucket names stay case-sensitive.

use crate::error::{LedgerError, LedgerResult};

/// Validate a bucket name before it is stored.
pub fn validate_bucket_name(name: &str) -> LedgerResult<()> {
    segment_problem(name).map_or(Ok(()), |reason| {
        Err(LedgerError::InvalidBucketName {
            name: name.to_string(),
            reason: reason.into(),
        })
    })
}

/// Validate a caller-chosen upload id before it is stored.
pub fn validate_upload_id(upload_id: &str) -> LedgerResult<()> {
    match segment_problem(upload_id) {
        None => Ok(()),
        Some(_) => Err(LedgerError::InvalidUploadID(upload_id.to_string())),
    }
}

fn segment_problem(segment: &str) -> Option<&'static str> {
    if segment.is_empty() {
        Some("must not be empty")
    } else if segment.contains('/') {
        Some("must not contain '/'")
    } else {
        None
    }
}
