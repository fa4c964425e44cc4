use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::store::Store;

/// Contact-form message. Stored only; delivery is somebody else's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Store {
    pub fn submit_feedback(&mut self, name: &str, email: &str, message: &str) -> Result<FeedbackEntry> {
        let (name, email, message) = (name.trim(), email.trim(), message.trim());
        if name.is_empty() || message.is_empty() {
            return Err(EngineError::InvalidInput(
                "name and message are required".into(),
            ));
        }
        if !email.contains('@') {
            return Err(EngineError::InvalidInput(format!("invalid email: {:?}", email)));
        }

        let entry = FeedbackEntry {
            id: self.feedback.len() as u64 + 1,
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            at: Utc::now(),
        };
        self.feedback.push(entry.clone());
        Ok(entry)
    }

    pub fn feedback(&self) -> &[FeedbackEntry] {
        &self.feedback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_is_appended() {
        let mut store = Store::default();
        let entry = store
            .submit_feedback("Asha", "asha@example.com", "Pickup was late")
            .unwrap();
        assert_eq!(entry.id, 1);
        assert!(store.submit_feedback("", "asha@example.com", "hi").is_err());
        assert!(store.submit_feedback("Asha", "not-an-email", "hi").is_err());
        assert_eq!(store.feedback().len(), 1);
    }
}
