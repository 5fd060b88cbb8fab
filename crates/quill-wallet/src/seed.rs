//! Seed manager: at-most-one mnemonic per wallet, stored encrypted under the
//! wallet password.

use tracing::info;

use quill_core::error::QuillError;
use quill_crypto::mnemonic::{self, SeedLang};
use quill_crypto::passwd;

use crate::Wallet;

impl Wallet {
    /// Produce a fresh 15-word mnemonic. Pure generation; nothing is stored
    /// until `save_seed`.
    pub async fn gen_seed(&self, lang: SeedLang) -> Result<String, QuillError> {
        Ok(mnemonic::generate(lang))
    }

    /// Install the wallet's seed and first password. The wallet stays
    /// Locked; `unlock` with the same password follows.
    pub async fn save_seed(&self, password: &str, seed: &str) -> Result<(), QuillError> {
        if password.is_empty() {
            return Err(QuillError::InvalidInput("empty password".into()));
        }
        if self.store.seed()?.is_some() {
            return Err(QuillError::SeedExists);
        }
        let (canonical, lang) = mnemonic::validate(seed)?;
        let ciphertext = passwd::encrypt_text(password, &canonical)?;

        let mut batch = self.store.batch();
        batch.put_seed(&ciphertext, lang.code());
        batch.put_password_hash(&passwd::password_hash(password));
        batch.set_encryption_flag();
        self.store.apply(batch)?;

        info!(lang = ?lang, "seed saved");
        Ok(())
    }

    /// Return the decrypted mnemonic. Requires an unlocked wallet and a
    /// matching password.
    pub async fn get_seed(&self, password: &str) -> Result<String, QuillError> {
        let ciphertext = self.store.seed()?.ok_or(QuillError::SaveSeedFirst)?;
        let state = self.secret.lock().await;
        if state.locked {
            return Err(QuillError::WalletLocked);
        }
        self.verify_password(&state, password)?;
        passwd::decrypt_text(password, &ciphertext)
    }
}
