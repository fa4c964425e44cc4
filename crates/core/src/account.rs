use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{EngineError, Result};
use crate::submission::{SubmissionId, WasteCategory};
use crate::units::{Grams, Paise};

pub const MIN_PASSWORD_LEN: usize = 6;
/// Account id reserved for the operator console
pub const RESERVED_ACCOUNT_ID: &str = "admin";

const BIN_FILL_STEP: u8 = 15;
const BIN_EMPTY_STEP: u8 = 20;
const BIN_CAPACITY: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidInput("account id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Award,
    Referral,
    Withdrawal,
    Purchase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    /// Credits moved (added for awards/referrals, removed otherwise)
    pub credits: u64,
    /// Currency paid out or spent, when the transaction involves currency
    pub currency: Option<Paise>,
    /// Token or sale this transaction belongs to
    pub reference: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(skip_serializing)]
    password_digest: String,
    pub credits: u64,
    pub total_withdrawn: Paise,
    pub referral_used: bool,
    pub submissions: Vec<SubmissionId>,
    pub manure_purchased: Grams,
    pub transactions: Vec<Transaction>,
    pub co2_reduced_bps: u64,
    /// Fill level of the household organic bin, percent
    pub organic_bin: u8,
    pub inorganic_bin: u8,
    pub created_at: DateTime<Utc>,
}

fn password_digest(id: &AccountId, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"uramix:password:");
    hasher.update(id.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl Account {
    pub(crate) fn new(id: AccountId, password: &str, now: DateTime<Utc>) -> Self {
        let password_digest = password_digest(&id, password);
        Self {
            id,
            password_digest,
            credits: 0,
            total_withdrawn: Paise::ZERO,
            referral_used: false,
            submissions: Vec::new(),
            manure_purchased: Grams::ZERO,
            transactions: Vec::new(),
            co2_reduced_bps: 0,
            organic_bin: 0,
            inorganic_bin: 0,
            created_at: now,
        }
    }

    pub fn verify_password(&self, password: &str) -> bool {
        password_digest(&self.id, password) == self.password_digest
    }

    pub(crate) fn add_credits(
        &mut self,
        kind: TransactionKind,
        credits: u64,
        reference: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.credits = self.credits.saturating_add(credits);
        self.transactions.push(Transaction {
            kind,
            credits,
            currency: None,
            reference,
            at: now,
        });
    }

    /// Callers must have checked the balance; the debit itself cannot fail.
    pub(crate) fn remove_credits(
        &mut self,
        kind: TransactionKind,
        credits: u64,
        currency: Paise,
        reference: Option<String>,
        now: DateTime<Utc>,
    ) {
        debug_assert!(credits <= self.credits);
        self.credits -= credits;
        self.transactions.push(Transaction {
            kind,
            credits,
            currency: Some(currency),
            reference,
            at: now,
        });
    }

    pub(crate) fn fill_bin(&mut self, category: WasteCategory) {
        let bin = self.bin_mut(category);
        *bin = bin.saturating_add(BIN_FILL_STEP).min(BIN_CAPACITY);
    }

    pub(crate) fn empty_bin(&mut self, category: WasteCategory) {
        let bin = self.bin_mut(category);
        *bin = bin.saturating_sub(BIN_EMPTY_STEP);
    }

    fn bin_mut(&mut self, category: WasteCategory) -> &mut u8 {
        match category {
            WasteCategory::Organic => &mut self.organic_bin,
            WasteCategory::Inorganic => &mut self.inorganic_bin,
        }
    }
}

pub(crate) fn validate_signup(id: &AccountId, password: &str) -> Result<()> {
    if id.as_str().eq_ignore_ascii_case(RESERVED_ACCOUNT_ID) {
        return Err(EngineError::InvalidInput(format!(
            "{:?} is reserved",
            RESERVED_ACCOUNT_ID
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidInput(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_is_trimmed() {
        assert_eq!(AccountId::new("  asha@example.com ").unwrap().as_str(), "asha@example.com");
        assert!(AccountId::new("   ").is_err());
    }

    #[test]
    fn test_password_digest_binds_account() {
        let a = Account::new(AccountId::new("a").unwrap(), "secret1", Utc::now());
        let b = Account::new(AccountId::new("b").unwrap(), "secret1", Utc::now());
        assert!(a.verify_password("secret1"));
        assert!(!a.verify_password("secret2"));
        assert_ne!(a.password_digest, b.password_digest);
    }

    #[test]
    fn test_bins_are_bounded() {
        let mut account = Account::new(AccountId::new("a").unwrap(), "secret1", Utc::now());
        for _ in 0..10 {
            account.fill_bin(WasteCategory::Organic);
        }
        assert_eq!(account.organic_bin, 100);
        account.empty_bin(WasteCategory::Inorganic);
        assert_eq!(account.inorganic_bin, 0);
    }

    #[test]
    fn test_signup_validation() {
        let admin = AccountId::new("Admin").unwrap();
        assert!(validate_signup(&admin, "longenough").is_err());
        let user = AccountId::new("user").unwrap();
        assert!(validate_signup(&user, "short").is_err());
        assert!(validate_signup(&user, "longenough").is_ok());
    }
}
