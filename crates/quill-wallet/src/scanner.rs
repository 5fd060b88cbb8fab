//! Block scanner: ingests connect/disconnect events and maintains the
//! height-ordered log of wallet-relevant transactions.
//!
//! All staged writes for one block commit as a single batch, so the log
//! either reflects the whole block or none of it. A ticket transaction
//! signed by a wallet key with an `ExecOk` receipt changes the set of
//! usable stake keys, so a `FlushTicket` is emitted on connect AND on
//! disconnect.

use tracing::{debug, warn};

use quill_core::constants::{COINS_EXECUTOR, TICKET_EXECUTOR};
use quill_core::error::QuillError;
use quill_core::transaction::{Block, CoinsAction, Receipt, ReceiptStatus, WalletTxDetail};
use quill_crypto::address_from_pubkey;

use crate::Wallet;

#[derive(Clone, Copy, PartialEq)]
enum ScanMode {
    Connect,
    Disconnect,
}

impl Wallet {
    pub async fn block_connected(&self, block: &Block, receipts: &[Receipt]) -> Result<(), QuillError> {
        self.scan_block(block, receipts, ScanMode::Connect).await
    }

    pub async fn block_disconnected(
        &self,
        block: &Block,
        receipts: &[Receipt],
    ) -> Result<(), QuillError> {
        self.scan_block(block, receipts, ScanMode::Disconnect).await
    }

    async fn scan_block(
        &self,
        block: &Block,
        receipts: &[Receipt],
        mode: ScanMode,
    ) -> Result<(), QuillError> {
        if block.txs.len() as i64 > self.cfg.max_tx_num_per_block {
            return Err(QuillError::InvalidInput(format!(
                "block {} carries {} transactions, above the ordinal-encoding cap {}",
                block.height,
                block.txs.len(),
                self.cfg.max_tx_num_per_block,
            )));
        }
        let wallet_addrs = self.store.address_set()?;
        if wallet_addrs.is_empty() {
            return Ok(());
        }

        let mut batch = self.store.batch();
        let mut needs_flush = false;
        for (i, tx) in block.txs.iter().enumerate() {
            let index = i as i64;
            let Some(receipt) = receipts.get(i) else {
                warn!(height = block.height, index, "missing receipt; transaction skipped");
                continue;
            };
            let from_addr = match &tx.signature {
                Some(sig) => address_from_pubkey(&sig.pubkey),
                None => {
                    warn!(height = block.height, index, "unsigned transaction; skipped");
                    continue;
                }
            };

            match tx.executor.as_str() {
                COINS_EXECUTOR => {
                    let amount = match CoinsAction::decode(&tx.payload) {
                        Ok(CoinsAction::Transfer { amount, .. }) => amount,
                        Ok(_) => 0,
                        Err(e) => {
                            warn!(height = block.height, index, error = %e,
                                  "undecodable coins payload; transaction skipped");
                            continue;
                        }
                    };
                    let relevant =
                        wallet_addrs.contains(&from_addr) || wallet_addrs.contains(&tx.to);
                    if !relevant {
                        continue;
                    }
                    match mode {
                        ScanMode::Connect => {
                            let detail = WalletTxDetail {
                                tx: tx.clone(),
                                height: block.height,
                                index,
                                receipt: *receipt,
                                block_time: block.block_time,
                                amount,
                                from_addr,
                            };
                            if let Err(e) = batch.put_wallet_tx(&detail) {
                                warn!(height = block.height, index, error = %e,
                                      "unencodable tx detail; transaction skipped");
                            }
                        }
                        ScanMode::Disconnect => batch.delete_wallet_tx(block.height, index),
                    }
                }
                TICKET_EXECUTOR => {
                    if receipt.status == ReceiptStatus::ExecOk
                        && wallet_addrs.contains(&from_addr)
                    {
                        needs_flush = true;
                    }
                }
                _ => {}
            }
        }
        self.store.apply(batch)?;

        if needs_flush {
            if let Err(e) = self.ports.consensus.flush_ticket().await {
                warn!(error = %e, "ticket flush after block event failed");
            }
        }
        debug!(
            height = block.height,
            connect = mode == ScanMode::Connect,
            "block scanned"
        );
        Ok(())
    }
}
