use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::submission::WasteCategory;
use crate::units::{Grams, Paise, GRAMS_PER_KG, PAISE_PER_RUPEE};

/// Per-deployment reward constants. Everything numeric about awarding,
/// converting and yielding lives here so deployments can tune it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRates {
    /// Base credits for a verified organic submission
    pub organic_base_credits: u64,
    /// Base credits for a verified inorganic submission
    pub inorganic_base_credits: u64,
    /// Quantity bonus in thousandths of a credit per kg (1500 = 1.5 credits/kg)
    pub bonus_millicredits_per_kg: u64,
    /// Upper bound on the quantity bonus
    pub bonus_cap: u64,
    /// Manure produced per kg of redeemed organic waste, in per-mille
    pub manure_yield_permille: u64,
    /// Single conversion constant for withdrawals and market purchases
    pub credits_per_rupee: u64,
    pub min_withdrawal: u64,
    pub referral_bonus: u64,
    /// CO2 reduction credited per organic redemption (basis points)
    pub organic_co2_bps: u64,
    /// CO2 reduction credited per inorganic redemption (basis points)
    pub inorganic_co2_bps: u64,
}

impl Default for RewardRates {
    fn default() -> Self {
        Self {
            organic_base_credits: 60,
            inorganic_base_credits: 35,
            bonus_millicredits_per_kg: 1_500,
            bonus_cap: 15,
            manure_yield_permille: 300,
            credits_per_rupee: 20,
            min_withdrawal: 500,
            referral_bonus: 20,
            organic_co2_bps: 80,
            inorganic_co2_bps: 40,
        }
    }
}

impl RewardRates {
    pub fn validate(&self) -> Result<()> {
        if self.credits_per_rupee == 0 {
            return Err(EngineError::InvalidInput(
                "credits_per_rupee must be positive".into(),
            ));
        }
        if self.organic_base_credits <= self.inorganic_base_credits {
            return Err(EngineError::InvalidInput(format!(
                "organic base credits ({}) must exceed inorganic base credits ({})",
                self.organic_base_credits, self.inorganic_base_credits
            )));
        }
        if self.manure_yield_permille > 1_000 {
            return Err(EngineError::InvalidInput(format!(
                "manure yield cannot exceed 1000 per-mille, got {}",
                self.manure_yield_permille
            )));
        }
        if self.min_withdrawal == 0 {
            return Err(EngineError::InvalidInput(
                "min_withdrawal must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn base_credits(&self, category: WasteCategory) -> u64 {
        match category {
            WasteCategory::Organic => self.organic_base_credits,
            WasteCategory::Inorganic => self.inorganic_base_credits,
        }
    }

    /// base(category) + min(floor(bonus_rate * kg), cap)
    pub fn credits_for(&self, category: WasteCategory, quantity: Grams) -> u64 {
        let bonus = quantity.0 as u128 * self.bonus_millicredits_per_kg as u128
            / (1_000 * GRAMS_PER_KG as u128);
        let bonus = bonus.min(self.bonus_cap as u128) as u64;
        self.base_credits(category).saturating_add(bonus)
    }

    pub fn co2_bps(&self, category: WasteCategory) -> u64 {
        match category {
            WasteCategory::Organic => self.organic_co2_bps,
            WasteCategory::Inorganic => self.inorganic_co2_bps,
        }
    }

    pub fn manure_yield(&self, organic_quantity: Grams) -> Grams {
        organic_quantity.per_mille(self.manure_yield_permille)
    }

    /// Currency paid out for `credits`, rounded down to the paisa.
    pub fn credits_to_paise(&self, credits: u64) -> Result<Paise> {
        let paise = credits as u128 * PAISE_PER_RUPEE as u128 / self.credits_per_rupee as u128;
        narrow(paise, "payout").map(Paise)
    }

    /// Display value of a balance; saturates where `credits_to_paise` fails.
    pub fn currency_value(&self, credits: u64) -> Paise {
        self.credits_to_paise(credits).unwrap_or(Paise(u64::MAX))
    }

    /// Credits needed to cover `amount`, rounded up to the credit.
    pub fn paise_to_credits(&self, amount: Paise) -> Result<u64> {
        let credits =
            (amount.0 as u128 * self.credits_per_rupee as u128).div_ceil(PAISE_PER_RUPEE as u128);
        narrow(credits, "credit amount")
    }
}

fn narrow(value: u128, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| EngineError::InvalidInput(format!("{} out of range", what)))
}

/// Price of `quantity` at `price_per_kg`, rounded up to the paisa.
pub fn cost_of(quantity: Grams, price_per_kg: Paise) -> Result<Paise> {
    let paise = (quantity.0 as u128 * price_per_kg.0 as u128).div_ceil(GRAMS_PER_KG as u128);
    narrow(paise, "purchase cost").map(Paise)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_formula() {
        let rates = RewardRates::default();
        // 10 kg: 60 + min(15, 15)
        assert_eq!(rates.credits_for(WasteCategory::Organic, Grams::from_kg(10)), 75);
        // 3 kg: 35 + floor(4.5)
        assert_eq!(rates.credits_for(WasteCategory::Inorganic, Grams::from_kg(3)), 39);
        // bonus is capped
        assert_eq!(rates.credits_for(WasteCategory::Organic, Grams::from_kg(400)), 75);
        assert_eq!(rates.credits_for(WasteCategory::Organic, Grams(500)), 60);
    }

    #[test]
    fn test_conversion() {
        let rates = RewardRates::default();
        assert_eq!(rates.credits_to_paise(500), Ok(Paise(2_500)));
        assert_eq!(rates.credits_to_paise(1), Ok(Paise(5)));
        assert_eq!(rates.paise_to_credits(Paise::from_rupees(150)), Ok(3_000));
        assert_eq!(rates.paise_to_credits(Paise(1)), Ok(1));
    }

    #[test]
    fn test_conversion_overflow_is_an_error() {
        let rates = RewardRates {
            credits_per_rupee: 1,
            ..RewardRates::default()
        };
        assert!(matches!(
            rates.credits_to_paise(u64::MAX),
            Err(EngineError::InvalidInput(_))
        ));
        assert_eq!(rates.currency_value(u64::MAX), Paise(u64::MAX));

        let rates = RewardRates {
            credits_per_rupee: 1_000,
            ..RewardRates::default()
        };
        assert!(matches!(
            rates.paise_to_credits(Paise(u64::MAX)),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_cost_of() {
        assert_eq!(cost_of(Grams::from_kg(10), Paise::from_rupees(15)), Ok(Paise(15_000)));
        assert_eq!(cost_of(Grams(1), Paise(1)), Ok(Paise(1)));
        // 2 kg at 2^63 paise/kg is exactly 2^64
        assert!(matches!(
            cost_of(Grams::from_kg(2), Paise(1 << 63)),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_base_rates() {
        let rates = RewardRates {
            organic_base_credits: 30,
            ..RewardRates::default()
        };
        assert!(matches!(rates.validate(), Err(EngineError::InvalidInput(_))));
        assert!(RewardRates::default().validate().is_ok());
    }
}
