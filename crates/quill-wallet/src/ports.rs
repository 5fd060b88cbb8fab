//! Collaborator ports.
//!
//! The wallet talks to the rest of the node through these seams: the account
//! service for balances, the mempool for admission, the blockchain service
//! for history and tickets, and the consensus layer for ticket flushes. The
//! node wires bus clients behind them; tests wire fakes.

use std::sync::Arc;

use async_trait::async_trait;
use quill_core::error::QuillError;
use quill_core::transaction::{Transaction, WalletTxDetail};
use quill_core::types::{Address, Balance, Height, Ticket, TxHash};
use serde::{Deserialize, Serialize};

/// On-chain balance of one address as reported by the account service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub addr: Address,
    pub balance: Balance,
    pub frozen: Balance,
}

/// Cursor-paginated history query. `height = -1` means "from newest".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxListQuery {
    pub addr: Address,
    pub height: Height,
    pub index: i64,
    pub direction: i32,
    pub count: usize,
}

/// One entry of a history page, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInfo {
    pub hash: TxHash,
    pub height: Height,
    pub index: i64,
}

#[async_trait]
pub trait AccountPort: Send + Sync {
    /// Balances for the given address set, one round trip.
    async fn balances(&self, addrs: &[Address]) -> Result<Vec<AccountBalance>, QuillError>;
}

#[async_trait]
pub trait MempoolPort: Send + Sync {
    /// Blocking admission request. `Err` carries the mempool's message.
    async fn submit(&self, tx: Transaction) -> Result<(), QuillError>;
}

#[async_trait]
pub trait ChainPort: Send + Sync {
    async fn tx_list(&self, query: TxListQuery) -> Result<Vec<TxInfo>, QuillError>;

    async fn tx_details(&self, hashes: &[TxHash]) -> Result<Vec<WalletTxDetail>, QuillError>;

    /// Consensus tickets bound to any of the given addresses.
    async fn tickets_for(&self, addrs: &[Address]) -> Result<Vec<Ticket>, QuillError>;
}

#[async_trait]
pub trait ConsensusPort: Send + Sync {
    /// Tell consensus the set of usable ticket-bearing keys changed.
    async fn flush_ticket(&self) -> Result<(), QuillError>;
}

/// The wallet's full collaborator wiring.
#[derive(Clone)]
pub struct Ports {
    pub accounts: Arc<dyn AccountPort>,
    pub mempool: Arc<dyn MempoolPort>,
    pub chain: Arc<dyn ChainPort>,
    pub consensus: Arc<dyn ConsensusPort>,
}
