//! # Amounts
//!
//! `Amount` is a non-negative quantity of the settlement currency in its
//! smallest unit. One whole unit is `10^18` base units, matching the
//! native-currency denomination the listing prices are quoted in.
//!
//! ## Security Invariant
//!
//! There is no `Add`/`Sub` implementation. Every arithmetic path is
//! `checked_*` (overflow surfaces as `None`) or explicitly `saturating_*`,
//! so a balance can never wrap around.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Decimal places between a whole unit and a base unit.
pub const UNIT_DECIMALS: u32 = 18;

const BASE_UNITS_PER_WHOLE: u128 = 10u128.pow(UNIT_DECIMALS);

/// A quantity of value in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    /// Zero base units.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw base-unit quantity.
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// `whole × 10^18` base units.
    ///
    /// `whole` is bounded by `u64`, so the product always fits in `u128`.
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole as u128 * BASE_UNITS_PER_WHOLE)
    }

    /// The raw base-unit quantity.
    pub const fn base_units(&self) -> u128 {
        self.0
    }

    /// Whether this amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `self + rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// `self - rhs`, or `None` if `rhs > self`.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// `self - rhs`, clamped at zero.
    pub fn saturating_sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }

    /// Sum of `amounts`, or `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
    }

    /// Parse a decimal base-unit string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidAmount(s.to_string()));
        }
        trimmed
            .parse::<u128>()
            .map(Amount)
            .map_err(|_| CoreError::InvalidAmount(s.to_string()))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::parse(&s).map_err(serde::de::Error::custom)
    }
}
