//! Catch-up synchronizer: background backfill of a newly imported address's
//! history into the tx log.
//!
//! Progress is driven by the cursor returned with each page, not by local
//! state, and every write lands on the deterministic per-(height, index)
//! key — so a crashed or concurrently-scanned catch-up converges without
//! duplication.

use std::sync::Arc;

use tracing::{debug, warn};

use quill_core::error::QuillError;
use quill_core::types::{Address, TxHash};
use quill_store::Store;

use crate::ports::{ChainPort, TxListQuery};
use crate::Wallet;

impl Wallet {
    /// Register a background catch-up task for `addr`. The task is tracked
    /// and awaited on shutdown; `import_privkey` returns before it finishes.
    pub(crate) async fn spawn_catchup(&self, addr: Address) {
        let store = self.store.clone();
        let chain = Arc::clone(&self.ports.chain);
        let page_size = self.cfg.max_tx_hashes_per_time;
        self.catchup.lock().await.spawn(async move {
            if let Err(e) = catch_up(&store, chain.as_ref(), page_size, &addr).await {
                warn!(%addr, error = %e, "catch-up failed");
            }
        });
    }
}

async fn catch_up(
    store: &Store,
    chain: &dyn ChainPort,
    page_size: usize,
    addr: &Address,
) -> Result<(), QuillError> {
    // height = -1 means "from newest"; pages arrive newest first.
    let mut cursor: Option<(i64, i64)> = None;
    loop {
        let query = TxListQuery {
            addr: addr.clone(),
            height: cursor.map_or(-1, |(h, _)| h),
            index: cursor.map_or(0, |(_, i)| i),
            direction: 0,
            count: page_size,
        };
        let infos = chain
            .tx_list(query)
            .await
            .map_err(|e| QuillError::downstream("CatchUp", e))?;
        let Some(oldest) = infos.last() else { break };

        let hashes: Vec<TxHash> = infos.iter().map(|i| i.hash).collect();
        let details = chain
            .tx_details(&hashes)
            .await
            .map_err(|e| QuillError::downstream("CatchUp", e))?;

        let mut batch = store.batch();
        for detail in &details {
            if let Err(e) = batch.put_wallet_tx(detail) {
                warn!(height = detail.height, index = detail.index, error = %e,
                      "unencodable tx detail; entry skipped");
            }
        }
        store.apply(batch)?;

        cursor = Some((oldest.height, oldest.index));
        if infos.len() < page_size {
            break;
        }
    }
    debug!(%addr, "catch-up complete");
    Ok(())
}
