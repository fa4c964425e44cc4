use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uramix_core::api::AccountProfile;
use uramix_core::feedback::FeedbackEntry;
use uramix_core::{AccountId, Store};

use crate::error::Result;

/// Signup, credential checks, profiles and the contact form.
pub struct AccountService {
    store: Arc<RwLock<Store>>,
}

impl AccountService {
    pub fn new(store: Arc<RwLock<Store>>) -> Self {
        Self { store }
    }

    pub async fn signup(&self, account_id: &str, password: &str) -> Result<AccountProfile> {
        let mut store = self.store.write().await;
        let account = store.signup(account_id, password).map_err(|e| {
            warn!("Signup rejected for {:?}: {}", account_id, e);
            e
        })?;
        info!("Account created: {}", account.id);
        Ok(AccountProfile::new(&account, store.rates()))
    }

    pub async fn login(&self, account_id: &str, password: &str) -> Result<AccountProfile> {
        let store = self.store.read().await;
        let account = store.login(account_id, password).map_err(|e| {
            warn!("Login failed for {:?}: {}", account_id, e);
            e
        })?;
        Ok(AccountProfile::new(account, store.rates()))
    }

    pub async fn profile(&self, account_id: &AccountId) -> Result<AccountProfile> {
        let store = self.store.read().await;
        let account = store.account(account_id)?;
        Ok(AccountProfile::new(account, store.rates()))
    }

    pub async fn submit_feedback(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<FeedbackEntry> {
        let entry = self
            .store
            .write()
            .await
            .submit_feedback(name, email, message)?;
        info!("Feedback #{} received from {}", entry.id, entry.email);
        Ok(entry)
    }

    pub async fn feedback(&self) -> Vec<FeedbackEntry> {
        self.store.read().await.feedback().to_vec()
    }
}
