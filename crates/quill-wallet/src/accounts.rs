//! Account registry: named (label → address → encrypted key) records.

use std::collections::HashMap;

use tracing::{info, warn};
use zeroize::Zeroizing;

use quill_core::error::QuillError;
use quill_core::types::{Address, Balance};
use quill_crypto::passwd;
use quill_crypto::KeyPair;
use quill_store::AccountRecord;

use crate::dispatch::{WalletAccount, WalletTickets};
use crate::Wallet;

impl Wallet {
    /// Derive the wallet's account from the seed and bind it to `label`.
    ///
    /// Derivation is deterministic with no index — one seed, one key — so a
    /// second call collides on the address and fails with `AddressTaken`.
    pub async fn new_account(&self, label: &str) -> Result<WalletAccount, QuillError> {
        if label.is_empty() {
            return Err(QuillError::InvalidInput("empty label".into()));
        }
        let password = self.unlocked_password().await?;
        if self.store.label_owner(label)?.is_some() {
            return Err(QuillError::LabelTaken(label.to_string()));
        }
        let seed_ct = self.store.seed()?.ok_or(QuillError::SaveSeedFirst)?;
        let seed = Zeroizing::new(passwd::decrypt_text(&password, &seed_ct)?);
        let keypair = KeyPair::from_seed_phrase(&seed)?;
        let addr = keypair.address();
        if self.store.account(&addr)?.is_some() {
            return Err(QuillError::AddressTaken(addr.to_string()));
        }

        let record = AccountRecord {
            addr: addr.clone(),
            label: label.to_string(),
            encrypted_privkey: passwd::encrypt_privkey(&password, &*keypair.secret_bytes())?,
        };
        let mut batch = self.store.batch();
        batch.put_account(&record)?;
        self.store.apply(batch)?;

        info!(%addr, label, "account created");
        Ok(WalletAccount { addr, label: label.to_string(), balance: 0, frozen: 0 })
    }

    /// Import an externally-generated private key under `label`.
    ///
    /// Triggers a ticket flush (the signable key set changed) and a
    /// background catch-up of the address's history.
    pub async fn import_privkey(
        &self,
        label: &str,
        privkey_hex: &str,
    ) -> Result<WalletAccount, QuillError> {
        if label.is_empty() {
            return Err(QuillError::InvalidInput("empty label".into()));
        }
        let password = self.unlocked_password().await?;
        let key_bytes = Zeroizing::new(
            hex::decode(privkey_hex)
                .map_err(|_| QuillError::InvalidInput("malformed private key hex".into()))?,
        );
        let keypair = KeyPair::from_secret_bytes(&key_bytes)?;
        if self.store.label_owner(label)?.is_some() {
            return Err(QuillError::LabelTaken(label.to_string()));
        }
        let addr = keypair.address();
        let encrypted = passwd::encrypt_privkey(&password, &key_bytes)?;
        if let Some(existing) = self.store.account(&addr)? {
            if existing.encrypted_privkey == encrypted {
                return Err(QuillError::PrivKeyAlreadyPresent);
            }
            return Err(QuillError::PrivKeyConflict);
        }

        let record = AccountRecord {
            addr: addr.clone(),
            label: label.to_string(),
            encrypted_privkey: encrypted,
        };
        let mut batch = self.store.batch();
        batch.put_account(&record)?;
        self.store.apply(batch)?;
        info!(%addr, label, "private key imported");

        if let Err(e) = self.ports.consensus.flush_ticket().await {
            warn!(error = %e, "ticket flush after import failed");
        }
        self.spawn_catchup(addr.clone()).await;

        Ok(WalletAccount { addr, label: label.to_string(), balance: 0, frozen: 0 })
    }

    /// Rebind an address to a new label, deleting the old label index entry.
    pub async fn set_label(&self, addr: &Address, label: &str) -> Result<WalletAccount, QuillError> {
        if addr.is_empty() || label.is_empty() {
            return Err(QuillError::InvalidInput("empty address or label".into()));
        }
        let record = self
            .store
            .account(addr)?
            .ok_or_else(|| QuillError::InvalidInput(format!("unknown address: {addr}")))?;
        if let Some(owner) = self.store.label_owner(label)? {
            if owner != *addr {
                return Err(QuillError::LabelTaken(label.to_string()));
            }
        }

        let old_label = record.label.clone();
        let record = AccountRecord { label: label.to_string(), ..record };
        let mut batch = self.store.batch();
        batch.delete_label(&old_label);
        batch.put_account(&record)?;
        self.store.apply(batch)?;

        Ok(WalletAccount {
            addr: addr.clone(),
            label: label.to_string(),
            balance: 0,
            frozen: 0,
        })
    }

    /// Rotate the wallet password: hash, seed, and every account record are
    /// re-encrypted and committed in one batch. Records whose ciphertext no
    /// longer decrypts are logged and skipped; the rotation still commits.
    pub async fn set_password(&self, old: &str, new: &str) -> Result<(), QuillError> {
        if old.is_empty() || new.is_empty() {
            return Err(QuillError::InvalidInput("empty password".into()));
        }
        let seed_ct = self.store.seed()?.ok_or(QuillError::SaveSeedFirst)?;
        let mut state = self.secret.lock().await;
        if state.locked {
            return Err(QuillError::WalletLocked);
        }
        self.verify_password(&state, old)?;

        let mut batch = self.store.batch();
        batch.put_password_hash(&passwd::password_hash(new));
        batch.set_encryption_flag();

        let seed = Zeroizing::new(passwd::decrypt_text(old, &seed_ct)?);
        let lang = self.store.seed_lang()?.unwrap_or(0);
        batch.put_seed(&passwd::encrypt_text(new, &seed)?, lang);

        for record in self.store.accounts()? {
            match passwd::decrypt_privkey(old, &record.encrypted_privkey) {
                Ok(privkey) => {
                    let reencrypted = passwd::encrypt_privkey(new, &privkey)?;
                    batch.put_account(&AccountRecord {
                        encrypted_privkey: reencrypted,
                        ..record
                    })?;
                }
                Err(e) => {
                    warn!(addr = %record.addr, error = %e,
                          "account key unreadable; skipped in password rotation");
                }
            }
        }
        self.store.apply(batch)?;

        state.password = Some(new.to_string());
        info!("wallet password rotated");
        Ok(())
    }

    /// Every account with its on-chain balance. Does not require unlock;
    /// balance lookup failure zero-fills rather than failing the list.
    pub async fn account_list(&self) -> Result<Vec<WalletAccount>, QuillError> {
        let records = self.store.accounts()?;
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let addrs: Vec<Address> = records.iter().map(|r| r.addr.clone()).collect();
        let balances: HashMap<Address, (Balance, Balance)> =
            match self.ports.accounts.balances(&addrs).await {
                Ok(list) => list
                    .into_iter()
                    .map(|b| (b.addr, (b.balance, b.frozen)))
                    .collect(),
                Err(e) => {
                    warn!(error = %e, "balance lookup failed; reporting zero balances");
                    HashMap::new()
                }
            };
        Ok(records
            .into_iter()
            .map(|r| {
                let (balance, frozen) = balances.get(&r.addr).copied().unwrap_or((0, 0));
                WalletAccount { addr: r.addr, label: r.label, balance, frozen }
            })
            .collect())
    }

    /// Tickets bound to wallet addresses plus the decrypted private keys the
    /// consensus layer signs with. Requires an unlocked wallet.
    pub async fn tickets(&self) -> Result<WalletTickets, QuillError> {
        let password = self.unlocked_password().await?;
        let records = self.store.accounts()?;
        let addrs: Vec<Address> = records.iter().map(|r| r.addr.clone()).collect();
        let tickets = self
            .ports
            .chain
            .tickets_for(&addrs)
            .await
            .map_err(|e| QuillError::downstream("GetTickets", e))?;

        let mut privkeys = Vec::with_capacity(records.len());
        for record in &records {
            match passwd::decrypt_privkey(&password, &record.encrypted_privkey) {
                Ok(privkey) => privkeys.push(hex::encode(&*privkey)),
                Err(e) => warn!(addr = %record.addr, error = %e, "account key unreadable; skipped"),
            }
        }
        Ok(WalletTickets { tickets, privkeys })
    }
}
