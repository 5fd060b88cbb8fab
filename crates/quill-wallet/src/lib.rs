//! quill-wallet
//!
//! The wallet core of a Quill node. Custodies key material, derives and
//! authorizes transactions for owned addresses, and maintains a local
//! height-ordered index of wallet-relevant on-chain activity.
//!
//! Construction wires three things together: a [`quill_store::Store`], an
//! immutable [`WalletConfig`], and the collaborator [`Ports`]. The node then
//! calls [`dispatch::spawn`] to obtain a [`WalletHandle`] — the typed bus
//! surface every other component talks to. Requests are handled strictly
//! sequentially; block events are totally ordered with requests; catch-up
//! backfills run in the background and are awaited on shutdown.

pub mod accounts;
pub mod catchup;
pub mod config;
pub mod dispatch;
pub mod ports;
pub mod scanner;
pub mod secret;
pub mod seed;
pub mod txbuilder;

use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

use quill_core::error::QuillError;
use quill_core::types::Balance;
use quill_store::Store;

pub use config::WalletConfig;
pub use dispatch::{
    run, spawn, WalletAccount, WalletHandle, WalletRequest, WalletStatus, WalletTickets,
};
pub use ports::{
    AccountBalance, AccountPort, ChainPort, ConsensusPort, MempoolPort, Ports, TxInfo, TxListQuery,
};

use secret::SecretState;

/// The wallet core. One instance per node; owned by the dispatch task.
pub struct Wallet {
    store: Store,
    cfg: WalletConfig,
    ports: Ports,
    /// Lock state, cached password, relock timer. Shared with the timer task.
    secret: Arc<Mutex<SecretState>>,
    /// Current fee; persisted on change, cached here for the builder.
    fee: StdMutex<Balance>,
    /// Background catch-up tasks, drained on shutdown.
    catchup: Mutex<JoinSet<()>>,
}

impl Wallet {
    /// Wire a wallet over an already-open store. Starts locked with no
    /// cached password; the persisted fee is loaded, defaulting to
    /// `cfg.min_fee` on a fresh store.
    pub fn new(store: Store, cfg: WalletConfig, ports: Ports) -> Result<Self, QuillError> {
        let fee = store.fee()?.unwrap_or(cfg.min_fee);
        Ok(Self {
            store,
            cfg,
            ports,
            secret: Arc::new(Mutex::new(SecretState::default())),
            fee: StdMutex::new(fee),
            catchup: Mutex::new(JoinSet::new()),
        })
    }

    /// Open the store at `path` and wire a wallet over it.
    pub fn open<P: AsRef<std::path::Path>>(
        path: P,
        cfg: WalletConfig,
        ports: Ports,
    ) -> Result<Self, QuillError> {
        Self::new(Store::open(path)?, cfg, ports)
    }

    /// Read-only store access for the host (status pages, tests).
    pub fn store(&self) -> &Store {
        &self.store
    }
}
