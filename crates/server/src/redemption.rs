use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uramix_core::{RedemptionReceipt, Store, TokenId};

use crate::error::Result;

/// Token scanning. The whole check-and-credit runs under the store's write
/// lock, so concurrent scans of one token produce exactly one award.
pub struct RedemptionService {
    store: Arc<RwLock<Store>>,
}

impl RedemptionService {
    pub fn new(store: Arc<RwLock<Store>>) -> Self {
        Self { store }
    }

    pub async fn redeem(&self, token: &TokenId) -> Result<RedemptionReceipt> {
        let receipt = self.store.write().await.redeem(token).map_err(|e| {
            warn!("Redemption of {} rejected: {}", token, e);
            e
        })?;

        info!(
            "Redeemed {} for {}: +{} credits (balance {})",
            receipt.submission, receipt.account, receipt.credits, receipt.balance
        );
        if let Some(manure) = receipt.manure_added {
            info!("Manure stock +{} from {}", manure, receipt.submission);
        }
        Ok(receipt)
    }
}
