use serde::{Deserialize, Serialize};

use crate::error::QuillError;
use crate::types::{Address, Balance, Height, Timestamp};

// ── CoinsAction ──────────────────────────────────────────────────────────────

/// The on-chain action sum understood by the `coins` executor.
///
/// `Transfer` and `Withdraw` share one payload encoding with distinct tags;
/// the wallet chooses the variant by the sign of the requested amount.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoinsAction {
    /// Move `amount` from the signer to `tx.to`.
    Transfer { amount: Balance, note: String },

    /// Pull `amount` back from an executor-held balance to the signer.
    Withdraw { amount: Balance, note: String },
}

impl CoinsAction {
    /// Canonical payload encoding (bincode).
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).expect("coins action serialization is infallible")
    }

    pub fn decode(payload: &[u8]) -> Result<Self, QuillError> {
        bincode::deserialize(payload).map_err(|e| QuillError::Serialization(e.to_string()))
    }
}

// ── Signature ────────────────────────────────────────────────────────────────

/// SECP256K1 authorization attached to a transaction.
///
/// Carries the compressed public key alongside the compact signature so the
/// signer's address can be derived without key recovery.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub pubkey: Vec<u8>,
    pub sig: Vec<u8>,
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature(pk {}b, sig {}b)", self.pubkey.len(), self.sig.len())
    }
}

// ── Transaction ──────────────────────────────────────────────────────────────

/// A chain transaction as the wallet composes and scans it.
///
/// The hash is double-SHA256 of the canonical bincode serialization of all
/// fields EXCEPT `signature`, so the hash is stable across signing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Executor this transaction addresses (`coins`, `ticket`, …).
    pub executor: String,

    /// Encoded executor action (for `coins`: [`CoinsAction`]).
    pub payload: Vec<u8>,

    /// Fee in base units, paid by the signer.
    pub fee: Balance,

    /// Random 63-bit value; makes otherwise-identical transactions distinct.
    pub nonce: i64,

    /// Receiving address.
    pub to: Address,

    /// Present once signed.
    pub signature: Option<Signature>,
}

/// The body fields covered by the hash and the signature. Excludes
/// `signature` so body bytes stay stable while signing.
#[derive(Serialize)]
pub struct TransactionBody<'a> {
    pub executor: &'a str,
    pub payload: &'a [u8],
    pub fee: Balance,
    pub nonce: i64,
    pub to: &'a Address,
}

impl Transaction {
    pub fn body(&self) -> TransactionBody<'_> {
        TransactionBody {
            executor: &self.executor,
            payload: &self.payload,
            fee: self.fee,
            nonce: self.nonce,
            to: &self.to,
        }
    }

    /// Serialize the body to canonical bytes (bincode).
    pub fn body_bytes(&self) -> Vec<u8> {
        bincode::serialize(&self.body()).expect("body serialization is infallible")
    }
}

// ── Blocks and receipts ──────────────────────────────────────────────────────

/// Execution outcome of one transaction, delivered alongside its block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    ExecOk,
    ExecErr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub status: ReceiptStatus,
}

/// The slice of a block the wallet consumes. Receipts travel separately,
/// aligned positionally with `txs`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub height: Height,
    pub block_time: Timestamp,
    pub txs: Vec<Transaction>,
}

// ── WalletTxDetail ───────────────────────────────────────────────────────────

/// A wallet-relevant transaction as recorded in the height-ordered log.
///
/// `height` and `index` reconstruct the log key
/// (`tx:<zeropad18(height * MAX_TX_NUM_PER_BLOCK + index)>`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WalletTxDetail {
    pub tx: Transaction,
    pub height: Height,
    pub index: i64,
    pub receipt: Receipt,
    pub block_time: Timestamp,
    /// Transfer amount when the coins action was a transfer; 0 otherwise.
    pub amount: Balance,
    /// Address derived from the signature's public key.
    pub from_addr: Address,
}
