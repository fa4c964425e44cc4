use rand::RngCore;
use std::str::FromStr;
use uramix_core::market::{DEFAULT_PRICE_PER_KG, DEFAULT_STOCK};
use uramix_core::{Grams, Paise, RewardRates};

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret expected in the `x-operator-key` header
    pub operator_key: String,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub rates: RewardRates,
    pub initial_stock: Grams,
    pub initial_price: Paise,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_or("PORT", 8080);

        let operator_key = match std::env::var("OPERATOR_KEY") {
            Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => {
                let mut bytes = [0u8; 16];
                rand::thread_rng().fill_bytes(&mut bytes);
                let key = hex::encode(bytes);
                tracing::warn!(
                    "OPERATOR_KEY not set! Generated a one-off operator key for this run: {}",
                    key
                );
                key
            }
        };

        let defaults = RewardRates::default();
        let rates = RewardRates {
            organic_base_credits: env_or("ORGANIC_BASE_CREDITS", defaults.organic_base_credits),
            inorganic_base_credits: env_or(
                "INORGANIC_BASE_CREDITS",
                defaults.inorganic_base_credits,
            ),
            bonus_millicredits_per_kg: env_or(
                "BONUS_MILLICREDITS_PER_KG",
                defaults.bonus_millicredits_per_kg,
            ),
            bonus_cap: env_or("BONUS_CAP", defaults.bonus_cap),
            manure_yield_permille: env_or("MANURE_YIELD_PERMILLE", defaults.manure_yield_permille),
            credits_per_rupee: env_or("CREDITS_PER_RUPEE", defaults.credits_per_rupee),
            min_withdrawal: env_or("MIN_WITHDRAWAL", defaults.min_withdrawal),
            referral_bonus: env_or("REFERRAL_BONUS", defaults.referral_bonus),
            ..defaults
        };
        rates
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid reward rates: {}", e))?;

        let initial_stock = Grams(env_or("INITIAL_STOCK_GRAMS", DEFAULT_STOCK.0));
        let initial_price = Paise(env_or("INITIAL_PRICE_PAISE", DEFAULT_PRICE_PER_KG.0));

        Ok(Self {
            host,
            port,
            operator_key,
            rate_limit_per_second: env_or("RATE_LIMIT_PER_SECOND", 10),
            rate_limit_burst: env_or("RATE_LIMIT_BURST", 20),
            rates,
            initial_stock,
            initial_price,
        })
    }

    pub fn is_operator_key(&self, presented: &str) -> bool {
        !self.operator_key.is_empty() && presented == self.operator_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(env_or("URAMIX_TEST_UNSET_VARIABLE", 42u64), 42);
    }

    #[test]
    fn test_operator_key_check() {
        let mut config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            operator_key: "s3cret".into(),
            rate_limit_per_second: 10,
            rate_limit_burst: 20,
            rates: RewardRates::default(),
            initial_stock: DEFAULT_STOCK,
            initial_price: DEFAULT_PRICE_PER_KG,
        };
        assert!(config.is_operator_key("s3cret"));
        assert!(!config.is_operator_key("guess"));
        config.operator_key.clear();
        assert!(!config.is_operator_key(""));
    }
}
