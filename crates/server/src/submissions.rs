use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uramix_core::{
    AccountId, CreditPreview, Grams, Store, Submission, SubmissionId, WasteCategory,
};

use crate::error::Result;

pub struct SubmissionService {
    store: Arc<RwLock<Store>>,
}

impl SubmissionService {
    pub fn new(store: Arc<RwLock<Store>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, account: &AccountId, category: WasteCategory) -> Result<Submission> {
        let submission = self
            .store
            .write()
            .await
            .create_submission(account, category)
            .map_err(|e| {
                warn!("Submission rejected for {}: {}", account, e);
                e
            })?;
        info!(
            "Collection requested: {} ({}) by {}",
            submission.id, submission.category, submission.account
        );
        Ok(submission)
    }

    pub async fn verify(&self, id: SubmissionId, quantity: Grams) -> Result<Submission> {
        let submission = self
            .store
            .write()
            .await
            .verify_submission(id, quantity)
            .map_err(|e| {
                warn!("Verification of {} rejected: {}", id, e);
                e
            })?;
        info!(
            "Verified {}: {} of {} -> {} credits",
            submission.id,
            quantity,
            submission.category,
            submission.credits.unwrap_or_default()
        );
        Ok(submission)
    }

    pub async fn preview(&self, category: WasteCategory, quantity: Grams) -> Result<CreditPreview> {
        Ok(self.store.read().await.preview_credits(category, quantity)?)
    }

    pub async fn pending(&self) -> Vec<Submission> {
        self.store.read().await.pending_submissions()
    }

    pub async fn for_account(&self, account: &AccountId) -> Result<Vec<Submission>> {
        Ok(self.store.read().await.submissions_for(account)?)
    }
}
