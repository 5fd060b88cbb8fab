//! Dispatcher: the wallet's bus surface.
//!
//! One long-lived task owns the [`Wallet`] and drains a typed request
//! channel. Handlers run strictly sequentially, so block events are totally
//! ordered with every other operation and nothing interleaves with a
//! password rotation. Closing the channel (dropping every [`WalletHandle`])
//! stops the loop; in-flight catch-up tasks are awaited before the store is
//! flushed and the task exits.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use quill_core::error::QuillError;
use quill_core::transaction::{Block, Receipt};
use quill_core::types::{Address, Balance, Ticket, TxHash};
use quill_crypto::SeedLang;

use crate::Wallet;

/// Per-request reply channel.
pub type Reply<T> = oneshot::Sender<Result<T, QuillError>>;

// ── Reply payloads ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub addr: Address,
    pub label: String,
    pub balance: Balance,
    pub frozen: Balance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletStatus {
    pub has_seed: bool,
    pub locked: bool,
    pub encrypted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTickets {
    pub tickets: Vec<Ticket>,
    /// Hex-encoded private keys of every wallet account.
    pub privkeys: Vec<String>,
}

// ── Requests ─────────────────────────────────────────────────────────────────

/// Every message the bus can deliver to the wallet. Request variants carry
/// their reply channel; block events are fire-and-forget.
pub enum WalletRequest {
    GetAccountList { reply: Reply<Vec<WalletAccount>> },
    NewAccount { label: String, reply: Reply<WalletAccount> },
    ImportPrivKey { label: String, privkey: String, reply: Reply<WalletAccount> },
    SendToAddress { from: Address, to: Address, amount: Balance, note: String, reply: Reply<TxHash> },
    MergeBalance { to: Address, reply: Reply<Vec<TxHash>> },
    SetFee { amount: Balance, reply: Reply<()> },
    SetLabel { addr: Address, label: String, reply: Reply<WalletAccount> },
    SetPassword { old: String, new: String, reply: Reply<()> },
    Lock { reply: Reply<()> },
    Unlock { password: String, timeout_secs: u64, reply: Reply<()> },
    GenSeed { lang: SeedLang, reply: Reply<String> },
    GetSeed { password: String, reply: Reply<String> },
    SaveSeed { password: String, seed: String, reply: Reply<()> },
    GetWalletStatus { reply: Reply<WalletStatus> },
    GetTickets { reply: Reply<WalletTickets> },
    BlockConnected { block: Block, receipts: Vec<Receipt> },
    BlockDisconnected { block: Block, receipts: Vec<Receipt> },
}

// ── Handle ───────────────────────────────────────────────────────────────────

fn bus_closed() -> QuillError {
    QuillError::downstream("WalletBus", "dispatcher unavailable")
}

/// Cloneable client side of the wallet bus.
#[derive(Clone)]
pub struct WalletHandle {
    tx: mpsc::Sender<WalletRequest>,
}

impl WalletHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> WalletRequest,
    ) -> Result<T, QuillError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).await.map_err(|_| bus_closed())?;
        rx.await.map_err(|_| bus_closed())?
    }

    pub async fn get_account_list(&self) -> Result<Vec<WalletAccount>, QuillError> {
        self.request(|reply| WalletRequest::GetAccountList { reply }).await
    }

    pub async fn new_account(&self, label: &str) -> Result<WalletAccount, QuillError> {
        let label = label.to_string();
        self.request(|reply| WalletRequest::NewAccount { label, reply }).await
    }

    pub async fn import_privkey(
        &self,
        label: &str,
        privkey: &str,
    ) -> Result<WalletAccount, QuillError> {
        let (label, privkey) = (label.to_string(), privkey.to_string());
        self.request(|reply| WalletRequest::ImportPrivKey { label, privkey, reply })
            .await
    }

    pub async fn send_to_address(
        &self,
        from: Address,
        to: Address,
        amount: Balance,
        note: &str,
    ) -> Result<TxHash, QuillError> {
        let note = note.to_string();
        self.request(|reply| WalletRequest::SendToAddress { from, to, amount, note, reply })
            .await
    }

    pub async fn merge_balance(&self, to: Address) -> Result<Vec<TxHash>, QuillError> {
        self.request(|reply| WalletRequest::MergeBalance { to, reply }).await
    }

    pub async fn set_fee(&self, amount: Balance) -> Result<(), QuillError> {
        self.request(|reply| WalletRequest::SetFee { amount, reply }).await
    }

    pub async fn set_label(&self, addr: Address, label: &str) -> Result<WalletAccount, QuillError> {
        let label = label.to_string();
        self.request(|reply| WalletRequest::SetLabel { addr, label, reply }).await
    }

    pub async fn set_password(&self, old: &str, new: &str) -> Result<(), QuillError> {
        let (old, new) = (old.to_string(), new.to_string());
        self.request(|reply| WalletRequest::SetPassword { old, new, reply }).await
    }

    pub async fn lock(&self) -> Result<(), QuillError> {
        self.request(|reply| WalletRequest::Lock { reply }).await
    }

    pub async fn unlock(&self, password: &str, timeout_secs: u64) -> Result<(), QuillError> {
        let password = password.to_string();
        self.request(|reply| WalletRequest::Unlock { password, timeout_secs, reply })
            .await
    }

    pub async fn gen_seed(&self, lang: SeedLang) -> Result<String, QuillError> {
        self.request(|reply| WalletRequest::GenSeed { lang, reply }).await
    }

    pub async fn get_seed(&self, password: &str) -> Result<String, QuillError> {
        let password = password.to_string();
        self.request(|reply| WalletRequest::GetSeed { password, reply }).await
    }

    pub async fn save_seed(&self, password: &str, seed: &str) -> Result<(), QuillError> {
        let (password, seed) = (password.to_string(), seed.to_string());
        self.request(|reply| WalletRequest::SaveSeed { password, seed, reply }).await
    }

    pub async fn get_wallet_status(&self) -> Result<WalletStatus, QuillError> {
        self.request(|reply| WalletRequest::GetWalletStatus { reply }).await
    }

    pub async fn get_tickets(&self) -> Result<WalletTickets, QuillError> {
        self.request(|reply| WalletRequest::GetTickets { reply }).await
    }

    /// Fire-and-forget block event. Delivery failure means the dispatcher
    /// is gone, which only happens during shutdown.
    pub async fn block_connected(&self, block: Block, receipts: Vec<Receipt>) {
        let _ = self.tx.send(WalletRequest::BlockConnected { block, receipts }).await;
    }

    pub async fn block_disconnected(&self, block: Block, receipts: Vec<Receipt>) {
        let _ = self
            .tx
            .send(WalletRequest::BlockDisconnected { block, receipts })
            .await;
    }
}

// ── Dispatch loop ────────────────────────────────────────────────────────────

/// Spawn the dispatch task. The returned handle is the only way in; dropping
/// every clone of it shuts the wallet down.
pub fn spawn(wallet: Wallet) -> (WalletHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(64);
    let task = tokio::spawn(run(wallet, rx));
    (WalletHandle { tx }, task)
}

/// Drain requests until the channel closes, then shut down cleanly.
pub async fn run(wallet: Wallet, mut rx: mpsc::Receiver<WalletRequest>) {
    info!("wallet dispatcher started");
    while let Some(req) = rx.recv().await {
        wallet.handle(req).await;
    }
    wallet.shutdown().await;
}

impl Wallet {
    async fn handle(&self, req: WalletRequest) {
        match req {
            WalletRequest::GetAccountList { reply } => {
                let _ = reply.send(self.account_list().await);
            }
            WalletRequest::NewAccount { label, reply } => {
                let _ = reply.send(self.new_account(&label).await);
            }
            WalletRequest::ImportPrivKey { label, privkey, reply } => {
                let _ = reply.send(self.import_privkey(&label, &privkey).await);
            }
            WalletRequest::SendToAddress { from, to, amount, note, reply } => {
                let _ = reply.send(self.send_to_address(&from, &to, amount, &note).await);
            }
            WalletRequest::MergeBalance { to, reply } => {
                let _ = reply.send(self.merge_balance(&to).await);
            }
            WalletRequest::SetFee { amount, reply } => {
                let _ = reply.send(self.set_fee(amount).await);
            }
            WalletRequest::SetLabel { addr, label, reply } => {
                let _ = reply.send(self.set_label(&addr, &label).await);
            }
            WalletRequest::SetPassword { old, new, reply } => {
                let _ = reply.send(self.set_password(&old, &new).await);
            }
            WalletRequest::Lock { reply } => {
                let _ = reply.send(self.lock().await);
            }
            WalletRequest::Unlock { password, timeout_secs, reply } => {
                let _ = reply.send(self.unlock(&password, timeout_secs).await);
            }
            WalletRequest::GenSeed { lang, reply } => {
                let _ = reply.send(self.gen_seed(lang).await);
            }
            WalletRequest::GetSeed { password, reply } => {
                let _ = reply.send(self.get_seed(&password).await);
            }
            WalletRequest::SaveSeed { password, seed, reply } => {
                let _ = reply.send(self.save_seed(&password, &seed).await);
            }
            WalletRequest::GetWalletStatus { reply } => {
                let _ = reply.send(self.wallet_status().await);
            }
            WalletRequest::GetTickets { reply } => {
                let _ = reply.send(self.tickets().await);
            }
            WalletRequest::BlockConnected { block, receipts } => {
                if let Err(e) = self.block_connected(&block, &receipts).await {
                    error!(height = block.height, error = %e, "block connect failed");
                }
            }
            WalletRequest::BlockDisconnected { block, receipts } => {
                if let Err(e) = self.block_disconnected(&block, &receipts).await {
                    error!(height = block.height, error = %e, "block disconnect failed");
                }
            }
        }
    }

    /// Await background catch-up tasks, then flush the store.
    async fn shutdown(&self) {
        let mut catchup = self.catchup.lock().await;
        while catchup.join_next().await.is_some() {}
        if let Err(e) = self.store.flush() {
            error!(error = %e, "store flush on shutdown failed");
        }
        info!("wallet dispatcher stopped");
    }
}
