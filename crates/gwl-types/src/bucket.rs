use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::Record;

/// Durable record of a bucket.
///
/// `objects` maps object names to content hashes. `root` optionally names a
/// content-backend node whose links seed the object map the first time the
/// bucket is loaded into the cache.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRecord {
    pub name: String,
    pub root: Option<String>,
    pub objects: BTreeMap<String, String>,
}

impl BucketRecord {
    /// Create an empty bucket record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: None,
            objects: BTreeMap::new(),
        }
    }

    /// Create an empty bucket record whose objects live under a backend node.
    pub fn with_root(name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: Some(root.into()),
            objects: BTreeMap::new(),
        }
    }

    /// Content hash of the named object, if present.
    pub fn object_hash(&self, object: &str) -> Option<&str> {
        self.objects.get(object).map(String::as_str)
    }
}

impl Record for BucketRecord {
    const KIND: &'static str = "bucket record";
}
