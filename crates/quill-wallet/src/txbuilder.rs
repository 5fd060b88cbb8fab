//! Transaction builder: compose, sign, and submit coins transactions.

use rand::Rng;
use tracing::{info, warn};

use quill_core::constants::COINS_EXECUTOR;
use quill_core::error::QuillError;
use quill_core::transaction::{CoinsAction, Transaction};
use quill_core::types::{Address, Balance, TxHash};
use quill_crypto::hash::tx_hash_from_body;
use quill_crypto::passwd;
use quill_crypto::KeyPair;

use crate::Wallet;

/// Note attached to every merge transfer.
const MERGE_NOTE: &str = "MergeBalance";

fn random_nonce() -> i64 {
    rand::thread_rng().gen_range(0..i64::MAX)
}

impl Wallet {
    pub async fn set_fee(&self, amount: Balance) -> Result<(), QuillError> {
        if amount < self.cfg.min_fee {
            return Err(QuillError::FeeTooLow { min: self.cfg.min_fee });
        }
        self.store.set_fee(amount)?;
        *self.fee.lock().expect("fee mutex poisoned") = amount;
        info!(fee = amount, "fee updated");
        Ok(())
    }

    pub(crate) fn current_fee(&self) -> Balance {
        *self.fee.lock().expect("fee mutex poisoned")
    }

    /// Load and decrypt the signing key for one of our addresses.
    fn signing_key(&self, password: &str, addr: &Address) -> Result<KeyPair, QuillError> {
        let record = self
            .store
            .account(addr)?
            .ok_or_else(|| QuillError::InvalidInput(format!("address not in wallet: {addr}")))?;
        let privkey = passwd::decrypt_privkey(password, &record.encrypted_privkey)?;
        KeyPair::from_secret_bytes(&privkey)
    }

    /// Compose and sign a coins transaction.
    fn compose_signed(&self, keypair: &KeyPair, action: &CoinsAction, fee: Balance, to: Address) -> Transaction {
        let mut tx = Transaction {
            executor: COINS_EXECUTOR.to_string(),
            payload: action.encode(),
            fee,
            nonce: random_nonce(),
            to,
            signature: None,
        };
        let body = tx.body_bytes();
        tx.signature = Some(keypair.sign_body(&body));
        tx
    }

    /// Send `amount` from one of our addresses. A non-negative amount builds
    /// a transfer; a negative amount builds a withdrawal of its magnitude.
    pub async fn send_to_address(
        &self,
        from: &Address,
        to: &Address,
        amount: Balance,
        note: &str,
    ) -> Result<TxHash, QuillError> {
        if from.is_empty() || to.is_empty() {
            return Err(QuillError::InvalidInput("empty from or to address".into()));
        }
        let password = self.unlocked_password().await?;
        let fee = self.current_fee();

        let have = self.balance_of(from).await?;
        let need = amount.saturating_abs().saturating_add(fee);
        if have < need {
            return Err(QuillError::InsufficientBalance { need, have });
        }

        let action = if amount >= 0 {
            CoinsAction::Transfer { amount, note: note.to_string() }
        } else {
            CoinsAction::Withdraw { amount: amount.saturating_neg(), note: note.to_string() }
        };
        let keypair = self.signing_key(&password, from)?;
        let tx = self.compose_signed(&keypair, &action, fee, to.clone());
        let hash = tx_hash_from_body(&tx.body_bytes());

        self.ports
            .mempool
            .submit(tx)
            .await
            .map_err(|e| QuillError::downstream("SendToAddress", e))?;
        info!(%from, %to, amount, %hash, "transaction submitted");
        Ok(hash)
    }

    /// Sweep every other account's spendable balance into `to`. Per-account
    /// failures (unreadable key, mempool rejection) are logged and skipped;
    /// the reply carries only the hashes that succeeded.
    pub async fn merge_balance(&self, to: &Address) -> Result<Vec<TxHash>, QuillError> {
        if to.is_empty() {
            return Err(QuillError::InvalidInput("empty to address".into()));
        }
        let password = self.unlocked_password().await?;
        let fee = self.current_fee();

        let records: Vec<_> = self
            .store
            .accounts()?
            .into_iter()
            .filter(|r| r.addr != *to)
            .collect();
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let addrs: Vec<Address> = records.iter().map(|r| r.addr.clone()).collect();
        let balances = self
            .ports
            .accounts
            .balances(&addrs)
            .await
            .map_err(|e| QuillError::downstream("MergeBalance", e))?;

        let mut hashes = Vec::new();
        for balance in &balances {
            if balance.balance < fee {
                continue;
            }
            let record = records.iter().find(|r| r.addr == balance.addr);
            let Some(record) = record else { continue };

            let keypair = match passwd::decrypt_privkey(&password, &record.encrypted_privkey)
                .and_then(|privkey| KeyPair::from_secret_bytes(&privkey))
            {
                Ok(kp) => kp,
                Err(e) => {
                    warn!(addr = %record.addr, error = %e, "key unreadable; skipping merge");
                    continue;
                }
            };
            let action = CoinsAction::Transfer {
                amount: balance.balance - fee,
                note: MERGE_NOTE.to_string(),
            };
            let tx = self.compose_signed(&keypair, &action, fee, to.clone());
            let hash = tx_hash_from_body(&tx.body_bytes());
            match self.ports.mempool.submit(tx).await {
                Ok(()) => hashes.push(hash),
                Err(e) => warn!(addr = %record.addr, error = %e, "merge submit rejected; skipping"),
            }
        }
        info!(%to, merged = hashes.len(), "merge balance finished");
        Ok(hashes)
    }

    /// Single-address balance through the account service.
    async fn balance_of(&self, addr: &Address) -> Result<Balance, QuillError> {
        let balances = self
            .ports
            .accounts
            .balances(std::slice::from_ref(addr))
            .await
            .map_err(|e| QuillError::downstream("GetBalance", e))?;
        Ok(balances
            .iter()
            .find(|b| b.addr == *addr)
            .map(|b| b.balance)
            .unwrap_or(0))
    }
}
