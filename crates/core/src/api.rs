/// Request and response bodies shared by the HTTP server and client.
/// Quantities are grams and money is paise on the wire.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountId};
use crate::rates::RewardRates;
use crate::submission::{SubmissionId, WasteCategory};
use crate::token::TokenId;
use crate::units::{Grams, Paise};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub rates: RewardRates,
    pub min_password_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub account_id: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: AccountId,
    pub credits: u64,
    pub currency_value: Paise,
    pub referral_used: bool,
    pub submissions: Vec<SubmissionId>,
    pub manure_purchased: Grams,
    pub co2_reduced_bps: u64,
    pub organic_bin: u8,
    pub inorganic_bin: u8,
    pub created_at: DateTime<Utc>,
}

impl AccountProfile {
    pub fn new(account: &Account, rates: &RewardRates) -> Self {
        Self {
            id: account.id.clone(),
            credits: account.credits,
            currency_value: rates.currency_value(account.credits),
            referral_used: account.referral_used,
            submissions: account.submissions.clone(),
            manure_purchased: account.manure_purchased,
            co2_reduced_bps: account.co2_reduced_bps,
            organic_bin: account.organic_bin,
            inorganic_bin: account.inorganic_bin,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionRequest {
    pub account_id: AccountId,
    pub category: WasteCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub quantity_grams: Grams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewQuery {
    pub category: WasteCategory,
    pub quantity_grams: Grams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub token: TokenId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub credits: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralRequest {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub account_id: AccountId,
    pub quantity_grams: Grams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddStockRequest {
    pub quantity_grams: Grams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockResponse {
    pub stock: Grams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPriceRequest {
    pub price_per_kg_paise: Paise,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
    pub previous: Paise,
    pub price_per_kg: Paise,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}
