//! Document id minting.
//!
//! Id generation is explicitly an injectable, external collaborator (§1):
//! the crate defines the seam and ships one default implementation, a
//! 96-bit random hex string, matching the spec's stated default.

use rand::RngCore;

use crate::value::Value;

/// Mints a fresh, globally-unique id for documents inserted without `_id`.
pub trait IdMinter: Send + Sync {
    fn mint(&self) -> Value;
}

/// Default minter: 96 bits (12 bytes) of OS-seeded randomness, lower-case
/// hex encoded — the same shape `ObjectId`-style minters use elsewhere in
/// document databases, without committing to a timestamp+counter layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomHexMinter;

impl IdMinter for RandomHexMinter {
    fn mint(&self) -> Value {
        let mut bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut bytes);
        Value::String(hex::encode(bytes))
    }
}

/// The per-document storage blob is named after its id. String ids (the
/// common case — every minted id, and every id in spec examples) are used
/// verbatim for a readable file name; any other `Value` variant falls back
/// to a hex encoding of its codec bytes so non-string ids stay collision-free.
pub(crate) fn blob_name(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => hex::encode(crate::codec::DefaultCodec.encode_standalone(other)),
    }
}

#[cfg(test)]
#[path = "id_test.rs"]
mod id_test;
