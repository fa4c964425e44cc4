use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uramix_core::{AccountId, Grams, MarketStatus, Paise, Sale, Store};

use crate::error::Result;

/// Manure marketplace: purchases plus the operator's stock and price controls.
pub struct MarketService {
    store: Arc<RwLock<Store>>,
}

impl MarketService {
    pub fn new(store: Arc<RwLock<Store>>) -> Self {
        Self { store }
    }

    pub async fn status(&self) -> MarketStatus {
        self.store.read().await.market_status()
    }

    pub async fn sales(&self) -> Vec<Sale> {
        self.store.read().await.inventory().sales.clone()
    }

    pub async fn purchase(&self, account: &AccountId, quantity: Grams) -> Result<Sale> {
        let sale = self
            .store
            .write()
            .await
            .purchase(account, quantity)
            .map_err(|e| {
                warn!("Purchase of {} by {} rejected: {}", quantity, account, e);
                e
            })?;
        info!(
            "Sale #{}: {} to {} for {} ({} credits)",
            sale.id, sale.quantity, sale.account, sale.amount, sale.credits
        );
        Ok(sale)
    }

    pub async fn add_stock(&self, quantity: Grams) -> Grams {
        let stock = self.store.write().await.add_stock(quantity);
        info!("Stock +{} (now {})", quantity, stock);
        stock
    }

    pub async fn set_price(&self, price_per_kg: Paise) -> Result<Paise> {
        let previous = self.store.write().await.set_price(price_per_kg)?;
        info!("Price changed {}/kg -> {}/kg", previous, price_per_kg);
        Ok(previous)
    }
}
