use std::collections::HashSet;
use std::path::Path;

use tracing::error;

use quill_core::error::QuillError;
use quill_core::transaction::WalletTxDetail;
use quill_core::types::{Address, Height};

use crate::schema::{
    account_key, label_key, tx_key, AccountRecord, ACCOUNT_PREFIX, ENCRYPTED_KEY, FEE_KEY,
    PW_HASH_KEY, SEED_KEY, SEED_LANG_KEY, TX_PREFIX,
};

/// Persistent wallet store backed by sled (pure-Rust, no C dependencies).
///
/// One tree holds every record kind (see [`crate::schema`]) so that a single
/// [`WriteBatch`] commits atomically across them.
///
/// Cloning shares the underlying sled handles; batches stay atomic across
/// clones (background catch-up tasks write through their own clone).
#[derive(Clone)]
pub struct Store {
    db: sled::Db,
    tree: sled::Tree,
}

impl Store {
    /// Open or create the wallet store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, QuillError> {
        let db = sled::open(path).map_err(|e| {
            error!(error = %e, "failed to open wallet store");
            QuillError::Storage(e.to_string())
        })?;
        let tree = db.open_tree("wallet").map_err(|e| {
            error!(error = %e, "failed to open wallet tree");
            QuillError::Storage(e.to_string())
        })?;
        Ok(Self { db, tree })
    }

    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, QuillError> {
        self.tree
            .get(key.as_bytes())
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(|e| QuillError::Storage(e.to_string()))
    }

    fn put_raw(&self, key: &str, value: &[u8]) -> Result<(), QuillError> {
        self.tree
            .insert(key.as_bytes(), value)
            .map_err(|e| QuillError::Storage(e.to_string()))?;
        Ok(())
    }

    // ── Accounts ─────────────────────────────────────────────────────────────

    pub fn account(&self, addr: &Address) -> Result<Option<AccountRecord>, QuillError> {
        match self.get_raw(&account_key(addr))? {
            Some(bytes) => {
                let rec = bincode::deserialize(&bytes)
                    .map_err(|e| QuillError::Serialization(e.to_string()))?;
                Ok(Some(rec))
            }
            None => Ok(None),
        }
    }

    /// Address currently bound to `label`, if any.
    pub fn label_owner(&self, label: &str) -> Result<Option<Address>, QuillError> {
        match self.get_raw(&label_key(label))? {
            Some(bytes) => {
                let s = String::from_utf8(bytes)
                    .map_err(|e| QuillError::Serialization(e.to_string()))?;
                Ok(Some(Address::new(s)))
            }
            None => Ok(None),
        }
    }

    /// Every account record, in key order.
    pub fn accounts(&self) -> Result<Vec<AccountRecord>, QuillError> {
        let mut out = Vec::new();
        for item in self.tree.scan_prefix(ACCOUNT_PREFIX.as_bytes()) {
            let (_, bytes) = item.map_err(|e| QuillError::Storage(e.to_string()))?;
            let rec: AccountRecord = bincode::deserialize(&bytes)
                .map_err(|e| QuillError::Serialization(e.to_string()))?;
            out.push(rec);
        }
        Ok(out)
    }

    /// The wallet's address set, used by the scanner for relevance checks.
    pub fn address_set(&self) -> Result<HashSet<Address>, QuillError> {
        Ok(self.accounts()?.into_iter().map(|r| r.addr).collect())
    }

    // ── Seed / password ──────────────────────────────────────────────────────

    pub fn seed(&self) -> Result<Option<Vec<u8>>, QuillError> {
        self.get_raw(SEED_KEY)
    }

    pub fn seed_lang(&self) -> Result<Option<u8>, QuillError> {
        Ok(self.get_raw(SEED_LANG_KEY)?.and_then(|b| b.first().copied()))
    }

    pub fn password_hash(&self) -> Result<Option<Vec<u8>>, QuillError> {
        self.get_raw(PW_HASH_KEY)
    }

    pub fn encryption_flag(&self) -> Result<bool, QuillError> {
        Ok(matches!(self.get_raw(ENCRYPTED_KEY)?.as_deref(), Some([1, ..])))
    }

    // ── Fee ──────────────────────────────────────────────────────────────────

    pub fn fee(&self) -> Result<Option<i64>, QuillError> {
        match self.get_raw(FEE_KEY)? {
            Some(bytes) if bytes.len() == 8 => {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&bytes);
                Ok(Some(i64::from_be_bytes(arr)))
            }
            Some(_) => Err(QuillError::Storage("malformed FeeAmount record".into())),
            None => Ok(None),
        }
    }

    pub fn set_fee(&self, fee: i64) -> Result<(), QuillError> {
        self.put_raw(FEE_KEY, &fee.to_be_bytes())
    }

    // ── Tx log ───────────────────────────────────────────────────────────────

    pub fn wallet_tx(&self, height: Height, index: i64) -> Result<Option<WalletTxDetail>, QuillError> {
        match self.get_raw(&tx_key(height, index))? {
            Some(bytes) => {
                let detail = bincode::deserialize(&bytes)
                    .map_err(|e| QuillError::Serialization(e.to_string()))?;
                Ok(Some(detail))
            }
            None => Ok(None),
        }
    }

    /// The full tx log in ordinal (chain) order.
    pub fn wallet_txs(&self) -> Result<Vec<WalletTxDetail>, QuillError> {
        let mut out = Vec::new();
        for item in self.tree.scan_prefix(TX_PREFIX.as_bytes()) {
            let (_, bytes) = item.map_err(|e| QuillError::Storage(e.to_string()))?;
            let detail: WalletTxDetail = bincode::deserialize(&bytes)
                .map_err(|e| QuillError::Serialization(e.to_string()))?;
            out.push(detail);
        }
        Ok(out)
    }

    // ── Batches ──────────────────────────────────────────────────────────────

    pub fn batch(&self) -> WriteBatch {
        WriteBatch { inner: sled::Batch::default() }
    }

    /// Apply a staged batch atomically.
    pub fn apply(&self, batch: WriteBatch) -> Result<(), QuillError> {
        self.tree
            .apply_batch(batch.inner)
            .map_err(|e| QuillError::Storage(e.to_string()))
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), QuillError> {
        self.db.flush().map_err(|e| QuillError::Storage(e.to_string()))?;
        Ok(())
    }
}

// ── WriteBatch ───────────────────────────────────────────────────────────────

/// Staged multi-key mutation; atomic once passed to [`Store::apply`].
pub struct WriteBatch {
    inner: sled::Batch,
}

impl WriteBatch {
    /// Stage an account record together with its label index entry.
    pub fn put_account(&mut self, rec: &AccountRecord) -> Result<(), QuillError> {
        let bytes =
            bincode::serialize(rec).map_err(|e| QuillError::Serialization(e.to_string()))?;
        self.inner.insert(account_key(&rec.addr).into_bytes(), bytes);
        self.inner.insert(
            label_key(&rec.label).into_bytes(),
            rec.addr.as_str().as_bytes(),
        );
        Ok(())
    }

    pub fn delete_label(&mut self, label: &str) {
        self.inner.remove(label_key(label).into_bytes());
    }

    pub fn put_seed(&mut self, ciphertext: &[u8], lang_code: u8) {
        self.inner.insert(SEED_KEY.as_bytes(), ciphertext);
        self.inner.insert(SEED_LANG_KEY.as_bytes(), &[lang_code][..]);
    }

    pub fn put_password_hash(&mut self, hash: &[u8]) {
        self.inner.insert(PW_HASH_KEY.as_bytes(), hash);
    }

    pub fn set_encryption_flag(&mut self) {
        self.inner.insert(ENCRYPTED_KEY.as_bytes(), &[1u8][..]);
    }

    pub fn put_wallet_tx(&mut self, detail: &WalletTxDetail) -> Result<(), QuillError> {
        let bytes =
            bincode::serialize(detail).map_err(|e| QuillError::Serialization(e.to_string()))?;
        self.inner
            .insert(tx_key(detail.height, detail.index).into_bytes(), bytes);
        Ok(())
    }

    pub fn delete_wallet_tx(&mut self, height: Height, index: i64) {
        self.inner.remove(tx_key(height, index).into_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::transaction::{Receipt, ReceiptStatus, Transaction};

    fn temp_store(name: &str) -> Store {
        let dir = std::env::temp_dir().join(format!("quill_store_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        Store::open(&dir).expect("open temp store")
    }

    fn record(addr: &str, label: &str) -> AccountRecord {
        AccountRecord {
            addr: Address::new(addr),
            label: label.to_string(),
            encrypted_privkey: vec![0xAA; 64],
        }
    }

    fn detail(height: Height, index: i64) -> WalletTxDetail {
        WalletTxDetail {
            tx: Transaction {
                executor: "coins".into(),
                payload: vec![],
                fee: 1_000_000,
                nonce: 7,
                to: Address::new("to-addr"),
                signature: None,
            },
            height,
            index,
            receipt: Receipt { status: ReceiptStatus::ExecOk },
            block_time: 1_700_000_000,
            amount: 5,
            from_addr: Address::new("from-addr"),
        }
    }

    #[test]
    fn account_and_label_roundtrip() {
        let store = temp_store("account_roundtrip");
        let rec = record("addr1", "main");

        let mut batch = store.batch();
        batch.put_account(&rec).unwrap();
        store.apply(batch).unwrap();

        assert_eq!(store.account(&rec.addr).unwrap(), Some(rec.clone()));
        assert_eq!(store.label_owner("main").unwrap(), Some(rec.addr.clone()));
        assert_eq!(store.label_owner("other").unwrap(), None);
        assert_eq!(store.accounts().unwrap(), vec![rec]);
    }

    #[test]
    fn label_delete_unbinds() {
        let store = temp_store("label_delete");
        let mut batch = store.batch();
        batch.put_account(&record("addr1", "old")).unwrap();
        store.apply(batch).unwrap();

        let mut batch = store.batch();
        batch.delete_label("old");
        batch.put_account(&record("addr1", "new")).unwrap();
        store.apply(batch).unwrap();

        assert_eq!(store.label_owner("old").unwrap(), None);
        assert_eq!(
            store.label_owner("new").unwrap(),
            Some(Address::new("addr1"))
        );
    }

    #[test]
    fn tx_log_scan_is_chain_ordered() {
        let store = temp_store("tx_order");
        let mut batch = store.batch();
        // Staged deliberately out of order.
        for (h, i) in [(5i64, 3i64), (0, 1), (5, 0), (2, 7)] {
            batch.put_wallet_tx(&detail(h, i)).unwrap();
        }
        store.apply(batch).unwrap();

        let got: Vec<(Height, i64)> = store
            .wallet_txs()
            .unwrap()
            .into_iter()
            .map(|d| (d.height, d.index))
            .collect();
        assert_eq!(got, vec![(0, 1), (2, 7), (5, 0), (5, 3)]);
    }

    #[test]
    fn tx_delete_removes_exactly_one_key() {
        let store = temp_store("tx_delete");
        let mut batch = store.batch();
        batch.put_wallet_tx(&detail(5, 3)).unwrap();
        batch.put_wallet_tx(&detail(5, 4)).unwrap();
        store.apply(batch).unwrap();

        let mut batch = store.batch();
        batch.delete_wallet_tx(5, 3);
        store.apply(batch).unwrap();

        assert!(store.wallet_tx(5, 3).unwrap().is_none());
        assert!(store.wallet_tx(5, 4).unwrap().is_some());
    }

    #[test]
    fn scalar_records_roundtrip() {
        let store = temp_store("scalars");
        assert_eq!(store.fee().unwrap(), None);
        store.set_fee(2_000_000).unwrap();
        assert_eq!(store.fee().unwrap(), Some(2_000_000));

        assert!(!store.encryption_flag().unwrap());
        let mut batch = store.batch();
        batch.set_encryption_flag();
        batch.put_password_hash(&[9u8; 32]);
        batch.put_seed(&[1u8; 32], 1);
        store.apply(batch).unwrap();

        assert!(store.encryption_flag().unwrap());
        assert_eq!(store.password_hash().unwrap(), Some(vec![9u8; 32]));
        assert_eq!(store.seed().unwrap(), Some(vec![1u8; 32]));
        assert_eq!(store.seed_lang().unwrap(), Some(1));
    }
}
