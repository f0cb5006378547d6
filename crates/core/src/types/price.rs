//! Type-safe price representation using decimal arithmetic.
//!
//! Product costs and cart totals are exact decimals; no floating point is
//! involved anywhere in the money path.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// A product cost must be strictly positive.
    #[error("product cost must be greater than zero (got {0})")]
    NotPositive(Decimal),
}

/// A monetary amount in the store currency.
///
/// ## Examples
///
/// ```
/// use qkart_core::Price;
/// use rust_decimal::Decimal;
///
/// let cost = Price::positive(Decimal::from(100)).unwrap();
/// assert_eq!(cost.times(3), Price::new(Decimal::from(300)).unwrap());
/// assert_eq!(cost.to_string(), "$100.00");
///
/// assert!(Price::positive(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero, the value of an empty cart.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a non-negative price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a strictly positive price, as required for product costs.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] if `amount` is zero or negative.
    pub fn positive(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive(amount));
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a quantity, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at [`Decimal::MAX`]; both operands are non-negative.
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_rejects_zero_and_negative() {
        assert_eq!(
            Price::positive(Decimal::ZERO),
            Err(PriceError::NotPositive(Decimal::ZERO))
        );
        assert!(Price::positive(Decimal::from(-5)).is_err());
        assert!(Price::positive(Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn test_new_allows_zero() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
        assert!(Price::new(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let total: Price = std::iter::empty().sum();
        assert_eq!(total, Price::ZERO);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Price::positive(Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0)).unwrap();
        let max = Price::new(Decimal::MAX).unwrap();

        assert_eq!(huge.times(u32::MAX), max);
        assert_eq!(max + huge, max);
        assert_eq!([max, max, huge].into_iter().sum::<Price>(), max);
    }

    #[test]
    fn test_display_two_decimals() {
        let price = Price::new(Decimal::new(1999, 2)).unwrap();
        assert_eq!(price.to_string(), "$19.99");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
    }
}
