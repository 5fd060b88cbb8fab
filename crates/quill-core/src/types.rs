use serde::{Deserialize, Serialize};
use std::fmt;

/// Balance in the chain's base unit. Signed: the account model allows the
/// wallet to express withdrawals as negative amounts at the bus boundary.
pub type Balance = i64;

/// Unix timestamp (seconds, UTC) as carried by blocks.
pub type Timestamp = i64;

/// Block height.
pub type Height = i64;

// ── Address ──────────────────────────────────────────────────────────────────

/// Base58-checked public-key-hash address identifying an on-chain account.
///
/// The textual form is produced by `quill-crypto`; this type only carries it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.0.get(..8).unwrap_or(&self.0);
        write!(f, "Address({head}…)")
    }
}

// ── TxHash ───────────────────────────────────────────────────────────────────

/// 32-byte transaction hash: double-SHA256 of the canonical serialized body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({}…)", &self.to_hex()[..16])
    }
}

// ── Ticket ───────────────────────────────────────────────────────────────────

/// A consensus-layer stake object bound to a wallet address. The wallet does
/// not interpret ticket state; it only relays the records the blockchain
/// collaborator returns for the wallet's address set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub addr: Address,
    pub status: i32,
}
