//! Deterministic binary codec for persisted ledger records.
//!
//! Records are encoded with bincode using fixed-width integers and rejecting
//! trailing bytes. All maps inside records are `BTreeMap`s, so a given value
//! has exactly one encoding. Decoding re-encodes the value and rejects input
//! that is not in that canonical form, which makes `encode(decode(b)) == b`
//! hold for every accepted `b`.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TypeError;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// A record persisted in the metadata store.
pub trait Record: Serialize + DeserializeOwned {
    /// Human-readable record kind, used in error messages.
    const KIND: &'static str;

    /// Structural invariants checked after decoding. Returns the reason the
    /// record is inconsistent, if it is.
    fn inconsistency(&self) -> Option<String> {
        None
    }

    /// Encode this record into its canonical byte form.
    fn encode(&self) -> Result<Vec<u8>, TypeError> {
        options().serialize(self).map_err(|e| TypeError::Encode {
            kind: Self::KIND,
            reason: e.to_string(),
        })
    }

    /// Decode a record from bytes produced by [`Record::encode`].
    ///
    /// Malformed, non-canonical or inconsistent input fails with
    /// [`TypeError::Decode`].
    fn decode(bytes: &[u8]) -> Result<Self, TypeError> {
        let value: Self = options().deserialize(bytes).map_err(|e| TypeError::Decode {
            kind: Self::KIND,
            reason: e.to_string(),
        })?;
        if value.encode()? != bytes {
            return Err(TypeError::Decode {
                kind: Self::KIND,
                reason: "non-canonical encoding".into(),
            });
        }
        if let Some(reason) = value.inconsistency() {
            return Err(TypeError::Decode {
                kind: Self::KIND,
                reason,
            });
        }
        Ok(value)
    }
}
