use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use gwl_types::{content_hash, NodeDescriptor};
use tracing::debug;

use crate::error::{ContentError, ContentResult};
use crate::traits::ContentBackend;

/// In-memory content-addressed backend.
///
/// Intended for tests and embedding. Raw blocks and nodes are kept in
/// separate `HashMap`s keyed by hash. An optional artificial latency is
/// applied to every call, which lets tests exercise deadlines.
pub struct InMemoryContentBackend {
    blocks: RwLock<HashMap<String, Bytes>>,
    nodes: RwLock<HashMap<String, NodeDescriptor>>,
    latency: Option<Duration>,
    resolve_calls: AtomicUsize,
}

impl InMemoryContentBackend {
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            nodes: RwLock::new(HashMap::new()),
            latency: None,
            resolve_calls: AtomicUsize::new(0),
        }
    }

    /// Delay every backend call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store a raw block and return its hash.
    pub fn add_bytes(&self, data: impl Into<Bytes>) -> ContentResult<String> {
        let data = data.into();
        let hash = content_hash(&data);
        self.blocks
            .write()
            .map_err(|_| ContentError::Transport("block table poisoned".into()))?
            .entry(hash.clone())
            .or_insert(data);
        Ok(hash)
    }

    /// Store `data` as an object node and return the node hash.
    pub fn add_object(&self, data: impl Into<Bytes>) -> ContentResult<String> {
        let data = data.into();
        let size = data.len() as u64;
        let data_hash = self.add_bytes(data)?;
        self.add_node(data_hash, size, BTreeMap::new())
    }

    /// Store a directory node whose links map names to node hashes.
    pub fn add_directory(&self, links: BTreeMap<String, String>) -> ContentResult<String> {
        self.add_node(String::new(), 0, links)
    }

    /// Number of `resolve_node` calls served so far.
    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    fn add_node(
        &self,
        data_hash: String,
        size: u64,
        links: BTreeMap<String, String>,
    ) -> ContentResult<String> {
        let encoded = serde_json::to_vec(&(&data_hash, size, &links)).map_err(|e| {
            ContentError::Corrupt {
                hash: data_hash.clone(),
                reason: e.to_string(),
            }
        })?;
        let hash = content_hash(&encoded);
        let node = NodeDescriptor {
            hash: hash.clone(),
            data_hash,
            size,
            links,
        };
        self.nodes
            .write()
            .map_err(|_| ContentError::Transport("node table poisoned".into()))?
            .insert(hash.clone(), node);
        Ok(hash)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for InMemoryContentBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentBackend for InMemoryContentBackend {
    async fn resolve_node(&self, hash: &str) -> ContentResult<NodeDescriptor> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        debug!(hash, "resolving node");
        let nodes = self
            .nodes
            .read()
            .map_err(|_| ContentError::Transport("node table poisoned".into()))?;
        nodes
            .get(hash)
            .cloned()
            .ok_or_else(|| ContentError::NotFound(hash.to_string()))
    }

    async fn fetch_bytes(&self, hash: &str) -> ContentResult<Bytes> {
        self.simulate_latency().await;
        let blocks = self
            .blocks
            .read()
            .map_err(|_| ContentError::Transport("block table poisoned".into()))?;
        blocks
            .get(hash)
            .cloned()
            .ok_or_else(|| ContentError::NotFound(hash.to_string()))
    }
}

impl std::fmt::Debug for InMemoryContentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentBackend")
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}
