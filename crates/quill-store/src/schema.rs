//! Storage schema: key layout and stored record types.
//!
//! All keys live in one tree so a single batch can span every record kind:
//!
//!   Account:<addr>  → bincode(AccountRecord)
//!   Label:<label>   → addr bytes
//!   Seed            → encrypted mnemonic
//!   SeedLang        → language code (1 byte)
//!   PwHash          → password hash bytes
//!   Encrypted       → 0/1 flag
//!   FeeAmount       → i64 big-endian
//!   tx:<ordinal>    → bincode(WalletTxDetail), ordinal zero-padded to 18

use quill_core::constants::{MAX_TX_NUM_PER_BLOCK, TX_ORDINAL_WIDTH};
use quill_core::types::{Address, Height};
use serde::{Deserialize, Serialize};

pub const ACCOUNT_PREFIX: &str = "Account:";
pub const LABEL_PREFIX: &str = "Label:";
pub const SEED_KEY: &str = "Seed";
pub const SEED_LANG_KEY: &str = "SeedLang";
pub const PW_HASH_KEY: &str = "PwHash";
pub const ENCRYPTED_KEY: &str = "Encrypted";
pub const FEE_KEY: &str = "FeeAmount";
pub const TX_PREFIX: &str = "tx:";

pub fn account_key(addr: &Address) -> String {
    format!("{ACCOUNT_PREFIX}{addr}")
}

pub fn label_key(label: &str) -> String {
    format!("{LABEL_PREFIX}{label}")
}

/// Tx-log key: strictly increasing over the chain prefix because the ordinal
/// is `height * MAX_TX_NUM_PER_BLOCK + index` and the zero-padding keeps
/// lexicographic order equal to numeric order.
pub fn tx_key(height: Height, index: i64) -> String {
    let ordinal = height * MAX_TX_NUM_PER_BLOCK + index;
    format!("{TX_PREFIX}{ordinal:0width$}", width = TX_ORDINAL_WIDTH)
}

// ── AccountRecord ────────────────────────────────────────────────────────────

/// A named key custody record. The private key is stored encrypted under the
/// wallet password; the clear key exists only transiently in memory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub addr: Address,
    pub label: String,
    pub encrypted_privkey: Vec<u8>,
}
