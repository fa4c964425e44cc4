pub mod account;
pub mod api;
pub mod error;
pub mod feedback;
pub mod ledger;
pub mod market;
pub mod rates;
pub mod redemption;
pub mod registry;
pub mod stats;
pub mod store;
pub mod submission;
pub mod token;
pub mod units;

pub use account::{Account, AccountId, Transaction, TransactionKind};
pub use error::{EngineError, Result};
pub use ledger::{ReferralReceipt, Wallet, WithdrawalReceipt};
pub use market::{Inventory, MarketStatus, Sale};
pub use rates::RewardRates;
pub use redemption::RedemptionReceipt;
pub use registry::CreditPreview;
pub use stats::PlatformStats;
pub use store::Store;
pub use submission::{Submission, SubmissionId, SubmissionStatus, WasteCategory};
pub use token::{RedemptionToken, TokenId};
pub use units::{Grams, Paise};
