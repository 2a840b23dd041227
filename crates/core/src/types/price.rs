//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as plain JSON numbers on both the catalog wire and in the
//! stored cart, so serialization goes through `rust_decimal::serde::float`
//! rather than the string form.

use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when validating a price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// Unit prices must be strictly positive.
    #[error("price must be greater than zero (got {0})")]
    NotPositive(Decimal),

    /// The value could not be parsed as a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A monetary amount in the menu's single currency.
///
/// Unit prices of catalog and cart entries are always positive (see
/// [`Price::unit`]); aggregated totals may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// The zero amount, the total of an empty cart.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount without validation.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a unit price, rejecting zero and negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` if `amount <= 0`.
    pub fn unit(amount: Decimal) -> Result<Self, PriceError> {
        if amount > Decimal::ZERO {
            Ok(Self(amount))
        } else {
            Err(PriceError::NotPositive(amount))
        }
    }

    /// Price of `quantity` units at this unit price, or `None` if the total
    /// does not fit in a decimal.
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Price of up to `quantity` units.
    ///
    /// When the total of `quantity` units would overflow, the quantity is
    /// lowered to the largest one whose total fits. Returns the quantity used
    /// together with its exact total.
    #[must_use]
    pub fn times_capped(self, quantity: u32) -> (u32, Self) {
        if let Some(total) = self.checked_times(quantity) {
            return (quantity, total);
        }

        let limit = Decimal::MAX
            .checked_div(self.0.abs())
            .and_then(|limit| limit.floor().to_u32())
            .map_or(quantity, |limit| limit.min(quantity));

        // Division rounds, so the limit can be one too high.
        (1..=limit)
            .rev()
            .find_map(|q| self.checked_times(q).map(|total| (q, total)))
            .unwrap_or((1, self))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|e| PriceError::Invalid(e.to_string()))
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}
