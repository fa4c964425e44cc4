//! Integer units for mass and money. Quantities are kept in grams and money in
//! paise so that every ledger and stock computation is exact.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

pub const GRAMS_PER_KG: u64 = 1_000;
pub const PAISE_PER_RUPEE: u64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grams(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Paise(pub u64);

impl Grams {
    pub const ZERO: Grams = Grams(0);

    pub const fn from_kg(kg: u64) -> Self {
        Grams(kg * GRAMS_PER_KG)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Grams) -> Grams {
        Grams(self.0.saturating_add(other.0))
    }

    pub fn checked_sub(self, other: Grams) -> Option<Grams> {
        self.0.checked_sub(other.0).map(Grams)
    }

    /// Scales by `permille / 1000`, rounding down to the gram.
    pub fn per_mille(self, permille: u64) -> Grams {
        Grams((self.0 as u128 * permille as u128 / 1_000) as u64)
    }
}

impl Paise {
    pub const ZERO: Paise = Paise(0);

    pub const fn from_rupees(rupees: u64) -> Self {
        Paise(rupees * PAISE_PER_RUPEE)
    }

    pub fn saturating_add(self, other: Paise) -> Paise {
        Paise(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Grams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kg = self.0 / GRAMS_PER_KG;
        let rem = self.0 % GRAMS_PER_KG;
        if rem == 0 {
            write!(f, "{} kg", kg)
        } else {
            let frac = format!("{:03}", rem);
            write!(f, "{}.{} kg", kg, frac.trim_end_matches('0'))
        }
    }
}

impl fmt::Display for Paise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "₹{}.{:02}",
            self.0 / PAISE_PER_RUPEE,
            self.0 % PAISE_PER_RUPEE
        )
    }
}

/// Parses a non-negative decimal with at most `scale` fractional digits into
/// an integer count of `10^-scale` units ("2.5" with scale 3 -> 2500).
fn parse_scaled(raw: &str, scale: u32) -> Option<u64> {
    let raw = raw.trim();
    let (whole, frac) = match raw.split_once('.') {
        Some((w, f)) => (w, f),
        None => (raw, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > scale as usize {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut frac_value: u64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
    for _ in frac.len()..scale as usize {
        frac_value *= 10;
    }

    whole.checked_mul(10u64.pow(scale))?.checked_add(frac_value)
}

impl FromStr for Grams {
    type Err = EngineError;

    /// Accepts kilograms, e.g. `"10"`, `"2.5"` or `"0.125"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, 3)
            .map(Grams)
            .ok_or_else(|| EngineError::InvalidInput(format!("invalid quantity in kg: {:?}", s)))
    }
}

impl FromStr for Paise {
    type Err = EngineError;

    /// Accepts rupees, e.g. `"15"` or `"12.50"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('₹');
        parse_scaled(s, 2)
            .map(Paise)
            .ok_or_else(|| EngineError::InvalidInput(format!("invalid rupee amount: {:?}", s)))
    }
}
