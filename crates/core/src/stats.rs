use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::account::AccountId;
use crate::store::Store;
use crate::submission::SubmissionStatus;
use crate::units::{Grams, Paise};

/// Running totals updated on redemption.
#[derive(Debug, Default)]
pub(crate) struct Activity {
    pub(crate) total_credits_issued: u64,
    pub(crate) collected: BTreeMap<NaiveDate, Grams>,
}

impl Activity {
    pub(crate) fn record_collection(&mut self, day: NaiveDate, quantity: Grams, credits: u64) {
        self.total_credits_issued = self.total_credits_issued.saturating_add(credits);
        let entry = self.collected.entry(day).or_default();
        *entry = entry.saturating_add(quantity);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCollection {
    pub date: NaiveDate,
    pub quantity: Grams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub credits: u64,
    pub currency_value: Paise,
    pub submissions: usize,
    pub manure_purchased: Grams,
    pub referral_used: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub accounts: usize,
    pub total_credits_issued: u64,
    pub credits_outstanding: u64,
    pub currency_outstanding: Paise,
    pub total_withdrawn: Paise,
    pub pending: usize,
    pub verified: usize,
    pub redeemed: usize,
    pub manure_stock: Grams,
    pub manure_sold: Grams,
    pub revenue: Paise,
    pub co2_reduced_bps: u64,
    pub daily_collected: Vec<DailyCollection>,
    pub account_summaries: Vec<AccountSummary>,
}

impl Store {
    pub fn statistics(&self) -> PlatformStats {
        let count = |status: SubmissionStatus| {
            self.submissions
                .values()
                .filter(|s| s.status == status)
                .count()
        };

        let mut account_summaries: Vec<AccountSummary> = self
            .accounts
            .values()
            .map(|a| AccountSummary {
                id: a.id.clone(),
                credits: a.credits,
                currency_value: self.rates.currency_value(a.credits),
                submissions: a.submissions.len(),
                manure_purchased: a.manure_purchased,
                referral_used: a.referral_used,
            })
            .collect();
        account_summaries.sort_by(|a, b| a.id.cmp(&b.id));

        let credits_outstanding = self
            .accounts
            .values()
            .fold(0u64, |acc, a| acc.saturating_add(a.credits));

        PlatformStats {
            accounts: self.accounts.len(),
            total_credits_issued: self.activity.total_credits_issued,
            credits_outstanding,
            currency_outstanding: self.rates.currency_value(credits_outstanding),
            total_withdrawn: self
                .accounts
                .values()
                .fold(Paise::ZERO, |acc, a| acc.saturating_add(a.total_withdrawn)),
            pending: count(SubmissionStatus::Pending),
            verified: count(SubmissionStatus::Verified),
            redeemed: count(SubmissionStatus::Redeemed),
            manure_stock: self.inventory.stock,
            manure_sold: self.inventory.total_sold(),
            revenue: self.inventory.revenue(),
            co2_reduced_bps: self
                .accounts
                .values()
                .fold(0u64, |acc, a| acc.saturating_add(a.co2_reduced_bps)),
            daily_collected: self
                .activity
                .collected
                .iter()
                .map(|(date, quantity)| DailyCollection {
                    date: *date,
                    quantity: *quantity,
                })
                .collect(),
            account_summaries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::WasteCategory;
    use chrono::Utc;

    #[test]
    fn test_statistics_track_redemptions() {
        let mut store = Store::default();
        let asha = store.signup("asha", "compost1").unwrap().id;
        let ravi = store.signup("ravi", "compost2").unwrap().id;

        let first = store.create_submission(&asha, WasteCategory::Organic).unwrap().id;
        store.create_submission(&ravi, WasteCategory::Inorganic).unwrap();
        let token = store
            .verify_submission(first, Grams::from_kg(10))
            .unwrap()
            .token
            .unwrap();
        store.redeem(&token).unwrap();

        let stats = store.statistics();
        assert_eq!(stats.accounts, 2);
        assert_eq!(stats.total_credits_issued, 75);
        assert_eq!(stats.credits_outstanding, 75);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.verified, 0);
        assert_eq!(stats.redeemed, 1);
        assert_eq!(stats.co2_reduced_bps, 80);
        assert_eq!(
            stats.daily_collected,
            vec![DailyCollection {
                date: Utc::now().date_naive(),
                quantity: Grams::from_kg(10)
            }]
        );
        assert_eq!(stats.account_summaries[0].id, asha);
        assert_eq!(stats.account_summaries[1].credits, 0);
    }
}
