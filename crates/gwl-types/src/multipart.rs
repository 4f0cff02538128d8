use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::Record;

/// The object a multipart upload will eventually produce.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub bucket: String,
    pub name: String,
}

impl ObjectInfo {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }
}

/// One staged part of a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPartInfo {
    pub number: i64,
    pub data_hash: String,
}

/// An in-flight multipart upload.
///
/// Upload ids are chosen by the caller. Parts are keyed by part number and a
/// later write to the same number replaces the earlier one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartUpload {
    pub id: String,
    pub object_info: ObjectInfo,
    pub parts: BTreeMap<i64, ObjectPartInfo>,
}

impl MultipartUpload {
    /// Create an upload with no parts.
    pub fn new(id: impl Into<String>, object_info: ObjectInfo) -> Self {
        Self {
            id: id.into(),
            object_info,
            parts: BTreeMap::new(),
        }
    }

    /// Record a part, replacing any previous part with the same number.
    pub fn put_part(&mut self, number: i64, data_hash: impl Into<String>) {
        self.parts.insert(
            number,
            ObjectPartInfo {
                number,
                data_hash: data_hash.into(),
            },
        );
    }

    pub fn part(&self, number: i64) -> Option<&ObjectPartInfo> {
        self.parts.get(&number)
    }

    /// Part hashes in ascending part-number order.
    pub fn part_hashes(&self) -> Vec<String> {
        self.parts.values().map(|p| p.data_hash.clone()).collect()
    }
}

impl Record for MultipartUpload {
    const KIND: &'static str = "multipart upload";

    fn inconsistency(&self) -> Option<String> {
        self.parts
            .iter()
            .find(|(key, part)| **key != part.number)
            .map(|(key, part)| format!("part keyed {key} records number {}", part.number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketRecord;
    use proptest::prelude::*;

    #[test]
    fn put_part_overwrites_same_number() {
        let mut m = MultipartUpload::new("u1", ObjectInfo::new("b1", "o1"));
        m.put_part(1, "hashA");
        m.put_part(1, "hashB");
        assert_eq!(m.parts.len(), 1);
        assert_eq!(m.part(1).unwrap().data_hash, "hashB");
    }

    #[test]
    fn part_hashes_follow_part_order() {
        let mut m = MultipartUpload::new("u1", ObjectInfo::new("b1", "o1"));
        m.put_part(3, "c");
        m.put_part(1, "a");
        m.put_part(2, "b");
        assert_eq!(m.part_hashes(), vec!["a", "b", "c"]);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = MultipartUpload::decode(&[0xff; 5]).unwrap_err();
        assert!(matches!(err, crate::TypeError::Decode { kind: "multipart upload", .. }));
    }

    #[test]
    fn part_number_must_match_its_key() {
        let mut m = MultipartUpload::new("u1", ObjectInfo::new("b1", "o1"));
        m.put_part(2, "h2");
        m.parts.insert(
            3,
            ObjectPartInfo {
                number: 4,
                data_hash: "h4".into(),
            },
        );
        let bytes = m.encode().unwrap();
        let err = MultipartUpload::decode(&bytes).unwrap_err();
        assert_eq!(
            err,
            crate::TypeError::Decode {
                kind: "multipart upload",
                reason: "part keyed 3 records number 4".into()
            }
        );
    }

    fn arb_upload() -> impl Strategy<Value = MultipartUpload> {
        (
            "[a-z0-9-]{1,16}",
            "[a-z0-9]{1,12}",
            "[a-zA-Z0-9/._]{1,24}",
            prop::collection::btree_map(any::<i64>(), "[a-f0-9]{0,16}", 0..8),
        )
            .prop_map(|(id, bucket, name, parts)| {
                let mut m = MultipartUpload::new(id, ObjectInfo::new(bucket, name));
                for (n, h) in parts {
                    m.put_part(n, h);
                }
                m
            })
    }

    fn arb_bucket() -> impl Strategy<Value = BucketRecord> {
        (
            "[a-z0-9.-]{1,20}",
            proptest::option::of("[a-f0-9]{8}"),
            prop::collection::btree_map("\\PC{0,12}", "[a-f0-9]{0,16}", 0..8),
        )
            .prop_map(|(name, root, objects)| BucketRecord {
                name,
                root,
                objects,
            })
    }

    proptest! {
        #[test]
        fn upload_bytes_roundtrip(m in arb_upload()) {
            let bytes = m.encode().unwrap();
            let decoded = MultipartUpload::decode(&bytes).unwrap();
            prop_assert_eq!(&decoded, &m);
            prop_assert_eq!(decoded.encode().unwrap(), bytes);
        }

        #[test]
        fn bucket_bytes_roundtrip(b in arb_bucket()) {
            let bytes = b.encode().unwrap();
            let decoded = BucketRecord::decode(&bytes).unwrap();
            prop_assert_eq!(decoded.encode().unwrap(), bytes);
        }

        #[test]
        fn accepted_bytes_reencode_identically(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            if let Ok(m) = MultipartUpload::decode(&bytes) {
                prop_assert_eq!(m.encode().unwrap(), bytes);
            }
        }
    }
}
