use async_trait::async_trait;
use bytes::Bytes;
use gwl_types::NodeDescriptor;

use crate::error::ContentResult;

/// Client for a content-addressed storage network.
///
/// Calls may block on network I/O. Dropping a returned future abandons the
/// call; implementations must not leave partial effects behind when that
/// happens.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Resolve a content hash to its node descriptor.
    async fn resolve_node(&self, hash: &str) -> ContentResult<NodeDescriptor>;

    /// Fetch the raw bytes addressed by `hash`.
    async fn fetch_bytes(&self, hash: &str) -> ContentResult<Bytes>;
}

#[async_trait]
impl<T: ContentBackend + ?Sized> ContentBackend for std::sync::Arc<T> {
    async fn resolve_node(&self, hash: &str) -> ContentResult<NodeDescriptor> {
        (**self).resolve_node(hash).await
    }

    async fn fetch_bytes(&self, hash: &str) -> ContentResult<Bytes> {
        (**self).fetch_bytes(hash).await
    }
}
