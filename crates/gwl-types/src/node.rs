use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node resolved from a content backend.
///
/// An object node points at its payload through `data_hash`; a directory-like
/// node (such as a bucket root) names its children through `links`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub hash: String,
    pub data_hash: String,
    pub size: u64,
    pub links: BTreeMap<String, String>,
}

impl NodeDescriptor {
    /// Returns `true` if the node carries no payload of its own.
    pub fn is_directory(&self) -> bool {
        self.data_hash.is_empty()
    }
}
