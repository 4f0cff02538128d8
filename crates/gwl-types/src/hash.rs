/// Compute the content hash used to address `data` in a content backend.
///
/// The hash is the lowercase hex BLAKE3 digest of the raw bytes. Identical
/// content always produces the same hash.
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(blake3::hash(data).as_bytes())
}
