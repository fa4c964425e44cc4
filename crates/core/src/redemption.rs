use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::account::{AccountId, TransactionKind};
use crate::error::{EngineError, Result};
use crate::store::Store;
use crate::submission::{SubmissionId, SubmissionStatus, WasteCategory};
use crate::token::TokenId;
use crate::units::Grams;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionReceipt {
    pub token: TokenId,
    pub submission: SubmissionId,
    pub account: AccountId,
    pub category: WasteCategory,
    pub quantity: Grams,
    pub credits: u64,
    /// Added to market stock; organic only
    pub manure_added: Option<Grams>,
    pub co2_reduction_bps: u64,
    pub balance: u64,
}

impl Store {
    /// Redeems `token` exactly once. Every lookup happens before the first
    /// write, so a failure leaves the token unredeemed and the balance as is.
    pub fn redeem(&mut self, token: &TokenId) -> Result<RedemptionReceipt> {
        let entry = self.tokens.get(token).ok_or(EngineError::InvalidToken)?;
        if entry.redeemed {
            return Err(EngineError::AlreadyRedeemed);
        }

        let submission_id = entry.submission;
        let submission = self.submission(submission_id)?;
        if submission.status != SubmissionStatus::Verified {
            return Err(EngineError::InvalidState(format!(
                "{} is {}, expected verified",
                submission_id, submission.status
            )));
        }
        let (quantity, credits) = match (submission.quantity, submission.credits) {
            (Some(quantity), Some(credits)) => (quantity, credits),
            _ => {
                return Err(EngineError::InvalidState(format!(
                    "{} has no verified award",
                    submission_id
                )))
            }
        };
        let owner = submission.account.clone();
        let category = submission.category;

        // Every entry is borrowed before the first write.
        let account = self
            .accounts
            .get_mut(&owner)
            .ok_or_else(|| EngineError::not_found("account", &owner))?;
        let entry = self.tokens.get_mut(token).ok_or(EngineError::InvalidToken)?;
        let submission = self
            .submissions
            .get_mut(&submission_id)
            .ok_or_else(|| EngineError::not_found("submission", submission_id))?;

        let now = Utc::now();
        let co2_reduction_bps = self.rates.co2_bps(category);
        account.add_credits(TransactionKind::Award, credits, Some(token.to_string()), now);
        account.co2_reduced_bps = account.co2_reduced_bps.saturating_add(co2_reduction_bps);
        account.empty_bin(category);
        let balance = account.credits;

        entry.redeemed = true;
        entry.redeemed_at = Some(now);
        submission.status = SubmissionStatus::Redeemed;
        submission.redeemed_at = Some(now);

        let manure_added = match category {
            WasteCategory::Organic => {
                let manure = self.rates.manure_yield(quantity);
                self.inventory.stock = self.inventory.stock.saturating_add(manure);
                Some(manure)
            }
            WasteCategory::Inorganic => None,
        };
        self.activity
            .record_collection(now.date_naive(), quantity, credits);

        Ok(RedemptionReceipt {
            token: token.clone(),
            submission: submission_id,
            account: owner,
            category,
            quantity,
            credits,
            manure_added,
            co2_reduction_bps,
            balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verified(category: WasteCategory, kg: u64) -> (Store, AccountId, TokenId) {
        let mut store = Store::default();
        let account = store.signup("asha", "compost1").unwrap().id;
        let id = store.create_submission(&account, category).unwrap().id;
        let token = store
            .verify_submission(id, Grams::from_kg(kg))
            .unwrap()
            .token
            .unwrap();
        (store, account, token)
    }

    #[test]
    fn test_redeem_organic_tops_up_stock() {
        let (mut store, account, token) = verified(WasteCategory::Organic, 10);
        let stock_before = store.inventory().stock;

        let receipt = store.redeem(&token).unwrap();
        assert_eq!(receipt.credits, 75);
        assert_eq!(receipt.balance, 75);
        assert_eq!(receipt.manure_added, Some(Grams::from_kg(3)));
        assert_eq!(store.inventory().stock, stock_before.saturating_add(Grams::from_kg(3)));
        assert_eq!(store.balance(&account).unwrap(), 75);
        assert_eq!(
            store.submission(receipt.submission).unwrap().status,
            SubmissionStatus::Redeemed
        );
        assert!(store.token(&token).unwrap().redeemed);
        assert_eq!(store.account(&account).unwrap().co2_reduced_bps, 80);
    }

    #[test]
    fn test_redeem_inorganic_leaves_stock() {
        let (mut store, _, token) = verified(WasteCategory::Inorganic, 2);
        let stock_before = store.inventory().stock;
        let receipt = store.redeem(&token).unwrap();
        assert_eq!(receipt.credits, 38);
        assert_eq!(receipt.manure_added, None);
        assert_eq!(store.inventory().stock, stock_before);
    }

    #[test]
    fn test_redeem_twice_pays_once() {
        let (mut store, account, token) = verified(WasteCategory::Organic, 10);
        store.redeem(&token).unwrap();
        let stock = store.inventory().stock;

        assert_eq!(store.redeem(&token).unwrap_err(), EngineError::AlreadyRedeemed);
        assert_eq!(store.balance(&account).unwrap(), 75);
        assert_eq!(store.inventory().stock, stock);
    }

    #[test]
    fn test_redeem_unknown_token() {
        let mut store = Store::default();
        assert_eq!(
            store.redeem(&TokenId::parse("URX-nope")).unwrap_err(),
            EngineError::InvalidToken
        );
    }

    #[test]
    fn test_redeem_missing_account_is_atomic() {
        let (mut store, account, token) = verified(WasteCategory::Organic, 10);
        let removed = store.accounts.remove(&account);
        let stock = store.inventory().stock;

        assert!(matches!(
            store.redeem(&token),
            Err(EngineError::NotFound { kind: "account", .. })
        ));
        assert!(!store.token(&token).unwrap().redeemed);
        assert_eq!(store.inventory().stock, stock);

        store.accounts.insert(account.clone(), removed.unwrap());
        assert_eq!(store.redeem(&token).unwrap().balance, 75);
    }

    #[test]
    fn test_redeem_missing_submission_pays_nothing() {
        let (mut store, account, token) = verified(WasteCategory::Inorganic, 4);
        let submission = store.token(&token).unwrap().submission;
        store.submissions.remove(&submission);

        assert!(matches!(
            store.redeem(&token),
            Err(EngineError::NotFound { kind: "submission", .. })
        ));
        assert!(!store.token(&token).unwrap().redeemed);
        assert_eq!(store.balance(&account).unwrap(), 0);
        assert!(store.account(&account).unwrap().transactions.is_empty());
    }
}
