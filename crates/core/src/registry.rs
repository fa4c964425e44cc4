use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::error::{EngineError, Result};
use crate::store::Store;
use crate::submission::{Submission, SubmissionId, SubmissionStatus, WasteCategory};
use crate::token::{self, RedemptionToken};
use crate::units::Grams;

/// What an operator would award for a submission, without touching state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPreview {
    pub category: WasteCategory,
    pub quantity: Grams,
    pub credits: u64,
    pub co2_reduction_bps: u64,
    /// Manure the redemption would add to stock (organic only)
    pub manure_yield: Option<Grams>,
}

impl Store {
    pub fn create_submission(
        &mut self,
        account: &AccountId,
        category: WasteCategory,
    ) -> Result<Submission> {
        let id = SubmissionId(self.next_submission);
        let owner = self.account_mut(account)?;
        owner.submissions.push(id);
        owner.fill_bin(category);

        let submission = Submission::new(id, account.clone(), category, Utc::now());
        self.next_submission += 1;
        self.submissions.insert(id, submission.clone());
        Ok(submission)
    }

    /// Pending -> Verified. Computes the award and mints the token; value only
    /// moves when the token is redeemed.
    pub fn verify_submission(&mut self, id: SubmissionId, quantity: Grams) -> Result<Submission> {
        let submission = self.submission(id)?;
        if submission.status != SubmissionStatus::Pending {
            return Err(EngineError::InvalidState(format!(
                "{} is {}, expected pending",
                id, submission.status
            )));
        }
        if quantity.is_zero() {
            return Err(EngineError::InvalidInput(
                "verified quantity must be positive".into(),
            ));
        }

        let category = submission.category;
        let credits = self.rates.credits_for(category, quantity);
        let token_id = token::mint(id, category, credits, &self.tokens);
        let now = Utc::now();

        self.tokens.insert(
            token_id.clone(),
            RedemptionToken {
                id: token_id.clone(),
                submission: id,
                redeemed: false,
                issued_at: now,
                redeemed_at: None,
            },
        );

        let submission = self
            .submissions
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("submission", id))?;
        submission.status = SubmissionStatus::Verified;
        submission.quantity = Some(quantity);
        submission.credits = Some(credits);
        submission.token = Some(token_id);
        submission.verified_at = Some(now);
        Ok(submission.clone())
    }

    pub fn preview_credits(&self, category: WasteCategory, quantity: Grams) -> Result<CreditPreview> {
        if quantity.is_zero() {
            return Err(EngineError::InvalidInput("quantity must be positive".into()));
        }
        let manure_yield = match category {
            WasteCategory::Organic => Some(self.rates.manure_yield(quantity)),
            WasteCategory::Inorganic => None,
        };
        Ok(CreditPreview {
            category,
            quantity,
            credits: self.rates.credits_for(category, quantity),
            co2_reduction_bps: self.rates.co2_bps(category),
            manure_yield,
        })
    }

    pub fn submission(&self, id: SubmissionId) -> Result<&Submission> {
        self.submissions
            .get(&id)
            .ok_or_else(|| EngineError::not_found("submission", id))
    }

    /// Oldest first.
    pub fn pending_submissions(&self) -> Vec<Submission> {
        self.submissions
            .values()
            .filter(|s| s.status == SubmissionStatus::Pending)
            .cloned()
            .collect()
    }

    pub fn submissions_for(&self, account: &AccountId) -> Result<Vec<Submission>> {
        let owner = self.account(account)?;
        Ok(owner
            .submissions
            .iter()
            .filter_map(|id| self.submissions.get(id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_account() -> (Store, AccountId) {
        let mut store = Store::default();
        let account = store.signup("asha", "compost1").unwrap().id;
        (store, account)
    }

    #[test]
    fn test_create_is_pending_without_side_effects() {
        let (mut store, account) = store_with_account();
        let submission = store
            .create_submission(&account, WasteCategory::Organic)
            .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert_eq!(submission.quantity, None);
        assert_eq!(submission.credits, None);
        assert_eq!(submission.token, None);
        assert_eq!(store.balance(&account).unwrap(), 0);
        assert_eq!(store.account(&account).unwrap().organic_bin, 15);
        assert_eq!(store.pending_submissions().len(), 1);
    }

    #[test]
    fn test_create_unknown_account() {
        let mut store = Store::default();
        let ghost = AccountId::new("ghost").unwrap();
        assert!(matches!(
            store.create_submission(&ghost, WasteCategory::Inorganic),
            Err(EngineError::NotFound { kind: "account", .. })
        ));
        assert!(store.submissions.is_empty());
    }

    #[test]
    fn test_verify_sets_award_and_token_once() {
        let (mut store, account) = store_with_account();
        let id = store
            .create_submission(&account, WasteCategory::Organic)
            .unwrap()
            .id;

        let verified = store.verify_submission(id, Grams::from_kg(10)).unwrap();
        assert_eq!(verified.status, SubmissionStatus::Verified);
        assert_eq!(verified.credits, Some(75));
        assert_eq!(verified.quantity, Some(Grams::from_kg(10)));
        let token = verified.token.clone().unwrap();
        assert_eq!(store.token(&token).unwrap().submission, id);
        assert_eq!(store.balance(&account).unwrap(), 0);

        let again = store.verify_submission(id, Grams::from_kg(20));
        assert!(matches!(again, Err(EngineError::InvalidState(_))));
        assert_eq!(store.submission(id).unwrap().token, Some(token));
        assert_eq!(store.tokens.len(), 1);
    }

    #[test]
    fn test_verify_rejects_zero_quantity_and_unknown_id() {
        let (mut store, account) = store_with_account();
        let id = store
            .create_submission(&account, WasteCategory::Inorganic)
            .unwrap()
            .id;

        assert!(matches!(
            store.verify_submission(id, Grams::ZERO),
            Err(EngineError::InvalidInput(_))
        ));
        assert_eq!(store.submission(id).unwrap().status, SubmissionStatus::Pending);
        assert!(matches!(
            store.verify_submission(SubmissionId(99), Grams::from_kg(1)),
            Err(EngineError::NotFound { kind: "submission", .. })
        ));
    }

    #[test]
    fn test_preview() {
        let store = Store::default();
        let preview = store
            .preview_credits(WasteCategory::Organic, Grams::from_kg(4))
            .unwrap();
        assert_eq!(preview.credits, 66);
        assert_eq!(preview.manure_yield, Some(Grams(1_200)));
        let preview = store
            .preview_credits(WasteCategory::Inorganic, Grams::from_kg(4))
            .unwrap();
        assert_eq!(preview.credits, 41);
        assert_eq!(preview.manure_yield, None);
    }

    #[test]
    fn test_submissions_for_account() {
        let (mut store, account) = store_with_account();
        store.signup("ravi", "compost2").unwrap();
        let ravi = AccountId::new("ravi").unwrap();
        store.create_submission(&account, WasteCategory::Organic).unwrap();
        store.create_submission(&ravi, WasteCategory::Organic).unwrap();
        store.create_submission(&account, WasteCategory::Inorganic).unwrap();

        let mine = store.submissions_for(&account).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|s| s.account == account));
    }
}
