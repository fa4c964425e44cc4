use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::account::{AccountId, Transaction, TransactionKind};
use crate::error::{EngineError, Result};
use crate::store::Store;
use crate::units::{Grams, Paise};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub account: AccountId,
    pub credits: u64,
    /// Derived from `credits` at the current conversion rate
    pub currency_value: Paise,
    pub total_withdrawn: Paise,
    pub referral_used: bool,
    pub manure_purchased: Grams,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub credits: u64,
    pub payout: Paise,
    pub balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralReceipt {
    pub bonus: u64,
    pub balance: u64,
}

impl Store {
    pub fn balance(&self, account: &AccountId) -> Result<u64> {
        Ok(self.account(account)?.credits)
    }

    pub fn currency_value(&self, account: &AccountId) -> Result<Paise> {
        Ok(self.rates.currency_value(self.balance(account)?))
    }

    pub fn wallet(&self, account: &AccountId) -> Result<Wallet> {
        let owner = self.account(account)?;
        Ok(Wallet {
            account: owner.id.clone(),
            credits: owner.credits,
            currency_value: self.rates.currency_value(owner.credits),
            total_withdrawn: owner.total_withdrawn,
            referral_used: owner.referral_used,
            manure_purchased: owner.manure_purchased,
            transactions: owner.transactions.clone(),
        })
    }

    /// Adds `amount` credits and returns the new balance.
    pub fn credit_award(
        &mut self,
        account: &AccountId,
        amount: u64,
        reference: Option<String>,
    ) -> Result<u64> {
        let owner = self.account_mut(account)?;
        owner.add_credits(TransactionKind::Award, amount, reference, Utc::now());
        Ok(owner.credits)
    }

    pub fn withdraw(&mut self, account: &AccountId, credits: u64) -> Result<WithdrawalReceipt> {
        let minimum = self.rates.min_withdrawal;
        let payout = self.rates.credits_to_paise(credits)?;
        let owner = self.account_mut(account)?;
        if credits < minimum || credits > owner.credits {
            return Err(EngineError::InsufficientCredits {
                requested: credits,
                available: owner.credits,
                minimum,
            });
        }

        owner.remove_credits(TransactionKind::Withdrawal, credits, payout, None, Utc::now());
        owner.total_withdrawn = owner.total_withdrawn.saturating_add(payout);
        Ok(WithdrawalReceipt {
            credits,
            payout,
            balance: owner.credits,
        })
    }

    /// One-time bonus. The code itself is not checked against anything; it only
    /// has to be present.
    pub fn apply_referral(&mut self, account: &AccountId, code: &str) -> Result<ReferralReceipt> {
        let bonus = self.rates.referral_bonus;
        let owner = self.account_mut(account)?;
        if owner.referral_used {
            return Err(EngineError::ReferralAlreadyUsed);
        }
        let code = code.trim();
        if code.is_empty() {
            return Err(EngineError::InvalidInput("referral code must not be empty".into()));
        }

        owner.add_credits(
            TransactionKind::Referral,
            bonus,
            Some(code.to_string()),
            Utc::now(),
        );
        owner.referral_used = true;
        Ok(ReferralReceipt {
            bonus,
            balance: owner.credits,
        })
    }
}
