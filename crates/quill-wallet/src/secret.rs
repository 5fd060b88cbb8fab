//! Lock/unlock state machine.
//!
//! States: NoSeed (no `Seed` record), Locked, Unlocked. The cached password
//! is retained across lock/unlock cycles; password-change verification
//! depends on that. The auto-relock timer takes the secret mutex before
//! flipping the lock flag, so an in-flight operation that already cloned the
//! password finishes and the next one observes the lock.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use quill_core::error::QuillError;
use quill_crypto::passwd;

use crate::dispatch::WalletStatus;
use crate::Wallet;

/// In-memory secret state. Process-lifetime; never persisted.
pub(crate) struct SecretState {
    pub locked: bool,
    pub password: Option<String>,
    relock: Option<AbortHandle>,
}

impl Default for SecretState {
    fn default() -> Self {
        Self { locked: true, password: None, relock: None }
    }
}

impl SecretState {
    fn cancel_relock(&mut self) {
        if let Some(handle) = self.relock.take() {
            handle.abort();
        }
    }
}

impl Wallet {
    /// Verify a caller-supplied password against the cached copy, or against
    /// the stored hash when nothing is cached yet.
    pub(crate) fn verify_password(
        &self,
        state: &SecretState,
        password: &str,
    ) -> Result<(), QuillError> {
        if state.password.is_none() && self.store.encryption_flag()? {
            let stored = self.store.password_hash()?.ok_or(QuillError::BadPassword)?;
            if stored == passwd::password_hash(password) {
                Ok(())
            } else {
                Err(QuillError::BadPassword)
            }
        } else {
            match &state.password {
                Some(cached) if cached == password => Ok(()),
                _ => Err(QuillError::BadPassword),
            }
        }
    }

    /// Clone the cached password, failing if the wallet is not usable for
    /// key operations (invariant: decrypting anything requires an unlocked
    /// wallet and a cached password).
    pub(crate) async fn unlocked_password(&self) -> Result<String, QuillError> {
        let state = self.secret.lock().await;
        if state.locked {
            return Err(QuillError::WalletLocked);
        }
        state.password.clone().ok_or(QuillError::UnlockFirst)
    }

    // ── Operations ───────────────────────────────────────────────────────────

    pub async fn lock(&self) -> Result<(), QuillError> {
        if self.store.seed()?.is_none() {
            return Err(QuillError::SaveSeedFirst);
        }
        let mut state = self.secret.lock().await;
        state.cancel_relock();
        state.locked = true;
        info!("wallet locked");
        Ok(())
    }

    /// Unlock with `password`; `timeout_secs > 0` arms the auto-relock timer.
    pub async fn unlock(&self, password: &str, timeout_secs: u64) -> Result<(), QuillError> {
        if self.store.seed()?.is_none() {
            return Err(QuillError::SaveSeedFirst);
        }
        let mut state = self.secret.lock().await;
        self.verify_password(&state, password)?;

        state.password = Some(password.to_string());
        state.locked = false;
        state.cancel_relock();
        if timeout_secs > 0 {
            let secret = Arc::clone(&self.secret);
            let task = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
                let mut state = secret.lock().await;
                state.locked = true;
                state.relock = None;
                debug!("auto-relock expired; wallet locked");
            });
            state.relock = Some(task.abort_handle());
        }
        drop(state);

        info!(timeout_secs, "wallet unlocked");
        // The set of signable keys just became usable again.
        if let Err(e) = self.ports.consensus.flush_ticket().await {
            warn!(error = %e, "ticket flush after unlock failed");
        }
        Ok(())
    }

    pub async fn wallet_status(&self) -> Result<WalletStatus, QuillError> {
        let state = self.secret.lock().await;
        Ok(WalletStatus {
            has_seed: self.store.seed()?.is_some(),
            locked: state.locked,
            encrypted: self.store.encryption_flag()?,
        })
    }
}
