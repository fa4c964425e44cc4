use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{AccountId, TransactionKind};
use crate::error::{EngineError, Result};
use crate::rates::cost_of;
use crate::store::Store;
use crate::units::{Grams, Paise};

pub const DEFAULT_STOCK: Grams = Grams::from_kg(500);
pub const DEFAULT_PRICE_PER_KG: Paise = Paise::from_rupees(25);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: u64,
    pub account: AccountId,
    pub quantity: Grams,
    pub amount: Paise,
    /// Credits debited for `amount`
    pub credits: u64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub stock: Grams,
    pub price_per_kg: Paise,
    pub sales: Vec<Sale>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            stock: DEFAULT_STOCK,
            price_per_kg: DEFAULT_PRICE_PER_KG,
            sales: Vec::new(),
        }
    }
}

impl Inventory {
    pub fn new(stock: Grams, price_per_kg: Paise) -> Result<Self> {
        if price_per_kg == Paise::ZERO {
            return Err(EngineError::InvalidInput("price must be positive".into()));
        }
        Ok(Self {
            stock,
            price_per_kg,
            sales: Vec::new(),
        })
    }

    pub fn total_sold(&self) -> Grams {
        self.sales
            .iter()
            .fold(Grams::ZERO, |acc, s| acc.saturating_add(s.quantity))
    }

    pub fn revenue(&self) -> Paise {
        self.sales
            .iter()
            .fold(Paise::ZERO, |acc, s| acc.saturating_add(s.amount))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStatus {
    pub stock: Grams,
    pub price_per_kg: Paise,
    pub total_sold: Grams,
    pub revenue: Paise,
    pub sales: usize,
    pub credits_per_rupee: u64,
}

impl Store {
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn market_status(&self) -> MarketStatus {
        MarketStatus {
            stock: self.inventory.stock,
            price_per_kg: self.inventory.price_per_kg,
            total_sold: self.inventory.total_sold(),
            revenue: self.inventory.revenue(),
            sales: self.inventory.sales.len(),
            credits_per_rupee: self.rates.credits_per_rupee,
        }
    }

    /// Operator restock. Returns the new stock level.
    pub fn add_stock(&mut self, quantity: Grams) -> Grams {
        self.inventory.stock = self.inventory.stock.saturating_add(quantity);
        self.inventory.stock
    }

    /// Applies to future purchases only; recorded sales keep their amounts.
    pub fn set_price(&mut self, price_per_kg: Paise) -> Result<Paise> {
        if price_per_kg == Paise::ZERO {
            return Err(EngineError::InvalidInput("price must be positive".into()));
        }
        let previous = self.inventory.price_per_kg;
        self.inventory.price_per_kg = price_per_kg;
        Ok(previous)
    }

    pub fn purchase(&mut self, account: &AccountId, quantity: Grams) -> Result<Sale> {
        if quantity.is_zero() {
            return Err(EngineError::InvalidInput("quantity must be positive".into()));
        }
        let remaining = self
            .inventory
            .stock
            .checked_sub(quantity)
            .ok_or(EngineError::InsufficientStock {
                requested: quantity,
                available: self.inventory.stock,
            })?;

        let cost = cost_of(quantity, self.inventory.price_per_kg)?;
        let required = self.rates.paise_to_credits(cost)?;
        let sale_id = self.inventory.sales.len() as u64 + 1;
        let now = Utc::now();

        let buyer = self.account_mut(account)?;
        if required > buyer.credits {
            return Err(EngineError::InsufficientBalance {
                cost,
                required,
                available: buyer.credits,
            });
        }
        buyer.remove_credits(
            TransactionKind::Purchase,
            required,
            cost,
            Some(format!("sale-{}", sale_id)),
            now,
        );
        buyer.manure_purchased = buyer.manure_purchased.saturating_add(quantity);

        let sale = Sale {
            id: sale_id,
            account: account.clone(),
            quantity,
            amount: cost,
            credits: required,
            at: now,
        };
        self.inventory.stock = remaining;
        self.inventory.sales.push(sale.clone());
        Ok(sale)
    }
}
