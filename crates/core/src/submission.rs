use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::account::AccountId;
use crate::error::EngineError;
use crate::token::TokenId;
use crate::units::Grams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SUB-{:06}", self.0)
    }
}

impl FromStr for SubmissionId {
    type Err = EngineError;

    /// Accepts both `SUB-000042` and `42`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("SUB-")
            .or_else(|| s.strip_prefix("sub-"))
            .unwrap_or(s);
        digits
            .parse()
            .map(SubmissionId)
            .map_err(|_| EngineError::InvalidInput(format!("invalid submission id: {:?}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    Organic,
    Inorganic,
}

impl WasteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Organic => "organic",
            WasteCategory::Inorganic => "inorganic",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WasteCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "organic" => Ok(WasteCategory::Organic),
            "inorganic" => Ok(WasteCategory::Inorganic),
            other => Err(EngineError::InvalidInput(format!(
                "unknown waste category: {:?}",
                other
            ))),
        }
    }
}

/// Lifecycle only moves forward: Pending -> Verified -> Redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Verified,
    Redeemed,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Verified => "verified",
            SubmissionStatus::Redeemed => "redeemed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub account: AccountId,
    pub category: WasteCategory,
    pub status: SubmissionStatus,
    pub requested_at: DateTime<Utc>,
    /// Measured by the operator; set on verification
    pub quantity: Option<Grams>,
    pub credits: Option<u64>,
    pub token: Option<TokenId>,
    pub verified_at: Option<DateTime<Utc>>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub(crate) fn new(
        id: SubmissionId,
        account: AccountId,
        category: WasteCategory,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account,
            category,
            status: SubmissionStatus::Pending,
            requested_at: now,
            quantity: None,
            credits: None,
            token: None,
            verified_at: None,
            redeemed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_id_round_trip() {
        let id = SubmissionId(42);
        assert_eq!(id.to_string(), "SUB-000042");
        assert_eq!("SUB-000042".parse::<SubmissionId>().unwrap(), id);
        assert_eq!("42".parse::<SubmissionId>().unwrap(), id);
        assert!("SUB-x".parse::<SubmissionId>().is_err());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Organic".parse::<WasteCategory>().unwrap(), WasteCategory::Organic);
        assert_eq!(" inorganic ".parse::<WasteCategory>().unwrap(), WasteCategory::Inorganic);
        assert!("metal".parse::<WasteCategory>().is_err());
    }
}
