use thiserror::Error;

use crate::units::{Grams, Paise};

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token already redeemed")]
    AlreadyRedeemed,

    #[error(
        "Insufficient credits: requested {requested}, available {available} (minimum withdrawal {minimum})"
    )]
    InsufficientCredits {
        requested: u64,
        available: u64,
        minimum: u64,
    },

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: Grams, available: Grams },

    #[error("Insufficient balance: purchase costs {cost} ({required} credits), available {available} credits")]
    InsufficientBalance {
        cost: Paise,
        required: u64,
        available: u64,
    },

    #[error("Referral bonus already used")]
    ReferralAlreadyUsed,

    #[error("Account already registered: {0}")]
    AccountExists(String),

    #[error("Incorrect account id or password")]
    InvalidCredentials,
}

impl EngineError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
