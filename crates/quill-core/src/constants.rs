//! ─── Quill Protocol Constants ───────────────────────────────────────────────
//!
//! Wallet-facing protocol constants. The values mirror the chain's consensus
//! rules; changing them breaks compatibility with existing stores.

// ── Fees ─────────────────────────────────────────────────────────────────────

/// Minimum per-transaction fee in base units. `SetFee` rejects anything lower.
pub const MIN_FEE: i64 = 1_000_000;

// ── Transaction log ──────────────────────────────────────────────────────────

/// Maximum transactions per block, and the stride of the tx-log ordinal:
/// `ordinal = height * MAX_TX_NUM_PER_BLOCK + index_in_block`.
///
/// A block exceeding this count cannot be losslessly ordinal-encoded.
pub const MAX_TX_NUM_PER_BLOCK: i64 = 100_000;

/// Zero-padded width of the ordinal in `tx:` keys. Wide enough for the
/// ordinal of any representable (height, index) pair.
pub const TX_ORDINAL_WIDTH: usize = 18;

// ── Catch-up ─────────────────────────────────────────────────────────────────

/// Page size for historical transaction backfill requests.
pub const MAX_TX_HASHES_PER_TIME: usize = 100;

// ── Seed ─────────────────────────────────────────────────────────────────────

/// Mnemonic seeds are exactly this many whitespace-separated words.
pub const SEED_WORD_COUNT: usize = 15;

// ── Executors ────────────────────────────────────────────────────────────────

/// Executor name for balance transfers and withdrawals.
pub const COINS_EXECUTOR: &str = "coins";

/// Executor name for consensus stake tickets.
pub const TICKET_EXECUTOR: &str = "ticket";
