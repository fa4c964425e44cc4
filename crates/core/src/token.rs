/// Redemption tokens. The token string is what gets printed as a QR code on the
/// collection slip; here it is only an opaque identifier bound to one submission.
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

use crate::submission::{SubmissionId, WasteCategory};

const TOKEN_PREFIX: &str = "URX-";
/// Bytes of the digest kept in the token (24 hex chars)
const TOKEN_BYTES: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    /// Wraps a scanned token string. Unknown values are rejected at redemption.
    pub fn parse(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionToken {
    pub id: TokenId,
    pub submission: SubmissionId,
    pub redeemed: bool,
    pub issued_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

pub fn derive_token_id(
    submission: SubmissionId,
    category: WasteCategory,
    credits: u64,
    salt: &[u8; 16],
) -> TokenId {
    let mut hasher = Sha256::new();
    hasher.update(b"uramix:token:");
    hasher.update(submission.0.to_le_bytes());
    hasher.update(category.as_str().as_bytes());
    hasher.update(credits.to_le_bytes());
    hasher.update(salt);
    let digest = hasher.finalize();
    TokenId(format!("{}{}", TOKEN_PREFIX, hex::encode(&digest[..TOKEN_BYTES])))
}

/// Mints a token id not present in `live`, redrawing the salt on collision.
pub(crate) fn mint(
    submission: SubmissionId,
    category: WasteCategory,
    credits: u64,
    live: &HashMap<TokenId, RedemptionToken>,
) -> TokenId {
    let mut rng = rand::thread_rng();
    loop {
        let mut salt = [0u8; 16];
        rng.fill_bytes(&mut salt);
        let id = derive_token_id(submission, category, credits, &salt);
        if !live.contains_key(&id) {
            return id;
        }
    }
}
