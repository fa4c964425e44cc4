use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

use crate::account::{validate_signup, Account, AccountId};
use crate::error::{EngineError, Result};
use crate::feedback::FeedbackEntry;
use crate::market::Inventory;
use crate::rates::RewardRates;
use crate::stats::Activity;
use crate::submission::{Submission, SubmissionId};
use crate::token::{RedemptionToken, TokenId};

/// All platform state. Constructed once at startup and handed to whoever
/// serves requests; every operation validates fully before it mutates, so a
/// failed call leaves the store untouched.
pub struct Store {
    pub(crate) rates: RewardRates,
    pub(crate) accounts: HashMap<AccountId, Account>,
    pub(crate) submissions: BTreeMap<SubmissionId, Submission>,
    pub(crate) tokens: HashMap<TokenId, RedemptionToken>,
    pub(crate) inventory: Inventory,
    pub(crate) activity: Activity,
    pub(crate) feedback: Vec<FeedbackEntry>,
    pub(crate) next_submission: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::from_parts(RewardRates::default(), Inventory::default())
    }
}

impl Store {
    pub fn new(rates: RewardRates, inventory: Inventory) -> Result<Self> {
        rates.validate()?;
        Ok(Self::from_parts(rates, inventory))
    }

    fn from_parts(rates: RewardRates, inventory: Inventory) -> Self {
        Self {
            rates,
            accounts: HashMap::new(),
            submissions: BTreeMap::new(),
            tokens: HashMap::new(),
            inventory,
            activity: Activity::default(),
            feedback: Vec::new(),
            next_submission: 1,
        }
    }

    pub fn rates(&self) -> &RewardRates {
        &self.rates
    }

    pub fn signup(&mut self, account_id: &str, password: &str) -> Result<Account> {
        let id = AccountId::new(account_id)?;
        validate_signup(&id, password)?;
        if self.accounts.contains_key(&id) {
            return Err(EngineError::AccountExists(id.to_string()));
        }

        let account = Account::new(id.clone(), password, Utc::now());
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    /// Credential check only; sessions belong to the caller.
    pub fn login(&self, account_id: &str, password: &str) -> Result<&Account> {
        let id = AccountId::new(account_id)?;
        let account = self.account(&id)?;
        if !account.verify_password(password) {
            return Err(EngineError::InvalidCredentials);
        }
        Ok(account)
    }

    pub fn account(&self, id: &AccountId) -> Result<&Account> {
        self.accounts
            .get(id)
            .ok_or_else(|| EngineError::not_found("account", id))
    }

    pub(crate) fn account_mut(&mut self, id: &AccountId) -> Result<&mut Account> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("account", id))
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn token(&self, id: &TokenId) -> Result<&RedemptionToken> {
        self.tokens.get(id).ok_or(EngineError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_and_login() {
        let mut store = Store::default();
        store.signup("asha@example.com", "compost1").unwrap();

        assert!(store.login("asha@example.com", "compost1").is_ok());
        assert_eq!(
            store.login("asha@example.com", "wrong-pass").unwrap_err(),
            EngineError::InvalidCredentials
        );
        assert!(matches!(
            store.login("nobody@example.com", "compost1"),
            Err(EngineError::NotFound { kind: "account", .. })
        ));
    }

    #[test]
    fn test_signup_rejects_duplicates_and_bad_input() {
        let mut store = Store::default();
        store.signup("asha", "compost1").unwrap();
        assert_eq!(
            store.signup("asha", "compost2").unwrap_err(),
            EngineError::AccountExists("asha".into())
        );
        assert!(matches!(store.signup("", "compost1"), Err(EngineError::InvalidInput(_))));
        assert!(matches!(store.signup("admin", "compost1"), Err(EngineError::InvalidInput(_))));
        assert!(matches!(store.signup("ravi", "abc"), Err(EngineError::InvalidInput(_))));
        assert_eq!(store.accounts().count(), 1);
    }

    #[test]
    fn test_new_validates_rates() {
        let rates = RewardRates {
            credits_per_rupee: 0,
            ..RewardRates::default()
        };
        assert!(Store::new(rates, Inventory::default()).is_err());
    }
}
