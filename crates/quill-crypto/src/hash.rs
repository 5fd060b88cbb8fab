use quill_core::types::TxHash;
use sha2::{Digest, Sha256};

/// SHA-256 of arbitrary bytes → 32-byte array.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// Double SHA-256, the chain's transaction digest.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Derive a TxHash from the canonical transaction body bytes.
pub fn tx_hash_from_body(body_bytes: &[u8]) -> TxHash {
    TxHash::from_bytes(sha256d(body_bytes))
}
