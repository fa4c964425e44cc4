use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uramix_core::{AccountId, ReferralReceipt, Store, Wallet, WithdrawalReceipt};

use crate::error::Result;

pub struct WalletService {
    store: Arc<RwLock<Store>>,
}

impl WalletService {
    pub fn new(store: Arc<RwLock<Store>>) -> Self {
        Self { store }
    }

    pub async fn wallet(&self, account: &AccountId) -> Result<Wallet> {
        Ok(self.store.read().await.wallet(account)?)
    }

    pub async fn withdraw(&self, account: &AccountId, credits: u64) -> Result<WithdrawalReceipt> {
        let receipt = self
            .store
            .write()
            .await
            .withdraw(account, credits)
            .map_err(|e| {
                warn!("Withdrawal of {} credits by {} rejected: {}", credits, account, e);
                e
            })?;
        info!(
            "Withdrawal by {}: {} credits -> {} (balance {})",
            account, receipt.credits, receipt.payout, receipt.balance
        );
        Ok(receipt)
    }

    pub async fn apply_referral(&self, account: &AccountId, code: &str) -> Result<ReferralReceipt> {
        let receipt = self
            .store
            .write()
            .await
            .apply_referral(account, code)
            .map_err(|e| {
                warn!("Referral for {} rejected: {}", account, e);
                e
            })?;
        info!("Referral bonus +{} for {}", receipt.bonus, account);
        Ok(receipt)
    }
}
