use quill_core::constants::{MAX_TX_HASHES_PER_TIME, MAX_TX_NUM_PER_BLOCK, MIN_FEE};
use quill_core::types::Balance;

/// Immutable wallet configuration, fixed at construction.
#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Floor for `SetFee`; also the initial fee for a fresh store.
    pub min_fee: Balance,

    /// Maximum transactions a block may carry and still be ordinal-encoded.
    pub max_tx_num_per_block: i64,

    /// Page size for catch-up history requests.
    pub max_tx_hashes_per_time: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            min_fee: MIN_FEE,
            max_tx_num_per_block: MAX_TX_NUM_PER_BLOCK,
            max_tx_hashes_per_time: MAX_TX_HASHES_PER_TIME,
        }
    }
}
