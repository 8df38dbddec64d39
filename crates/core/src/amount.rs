//! Amount - Non-negative fixed-point wrapper for monetary values
//!
//! All balances and movement amounts in CoreBank are non-negative decimals
//! with at most two fractional digits. Both constraints are enforced at the
//! type level.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of fractional digits carried by every monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Errors that can occur when constructing an amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Amount has more than {MONEY_SCALE} decimal places: {0}")]
    ExcessPrecision(Decimal),
}

/// A non-negative, scale-2 decimal amount.
///
/// # Invariants
/// The inner value is always >= 0 and representable with two fractional
/// digits. Both are enforced by the constructor.
///
/// # Example
/// ```
/// use corebank_core::Amount;
/// use rust_decimal::Decimal;
///
/// let amount = Amount::new(Decimal::new(15000, 2)).unwrap(); // 150.00
/// assert_eq!(amount.value(), Decimal::new(15000, 2));
///
/// // Negative amounts are rejected
/// assert!(Amount::new(Decimal::new(-100, 0)).is_err());
///
/// // Sub-cent precision is rejected, not rounded
/// assert!(Amount::new(Decimal::new(10001, 3)).is_err()); // 10.001
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error if the value is negative or carries more than
    /// [`MONEY_SCALE`] fractional digits.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::NegativeAmount(value));
        }
        let rounded = value.round_dp(MONEY_SCALE);
        if rounded != value {
            return Err(AmountError::ExcessPrecision(value));
        }
        Ok(Self(rounded))
    }

    /// Create an Amount without validation.
    ///
    /// # Safety
    /// The caller MUST ensure the value is non-negative and within scale.
    /// Use only for trusted sources (e.g. values replayed from a verified
    /// journal).
    #[inline]
    pub const fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if the amount is strictly positive
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if the result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(Amount(result))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut padded = self.0;
        padded.rescale(MONEY_SCALE);
        write!(f, "{}", padded)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(100.50)).unwrap();
        assert_eq!(amount.value(), dec!(100.50));
    }

    #[test]
    fn test_amount_zero() {
        let amount = Amount::new(Decimal::ZERO).unwrap();
        assert!(amount.is_zero());
        assert!(!amount.is_positive());
    }

    #[test]
    fn test_amount_negative_rejected() {
        let result = Amount::new(dec!(-100));
        assert!(matches!(result, Err(AmountError::NegativeAmount(_))));
    }

    #[test]
    fn test_amount_sub_cent_rejected() {
        let result = Amount::new(dec!(10.001));
        assert!(matches!(result, Err(AmountError::ExcessPrecision(_))));
    }

    #[test]
    fn test_checked_sub_prevents_negative() {
        let a = Amount::new(dec!(50)).unwrap();
        let b = Amount::new(dec!(100)).unwrap();
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn test_checked_sub_success() {
        let a = Amount::new(dec!(100)).unwrap();
        let b = Amount::new(dec!(30.25)).unwrap();
        let result = a.checked_sub(&b).unwrap();
        assert_eq!(result.value(), dec!(69.75));
    }

    #[test]
    fn test_display_pads_to_two_digits() {
        let amount = Amount::new(dec!(150)).unwrap();
        assert_eq!(amount.to_string(), "150.00");

        let amount = Amount::new(dec!(0.5)).unwrap();
        assert_eq!(amount.to_string(), "0.50");
    }

    #[test]
    fn test_serde_roundtrip() {
        let amount = Amount::new(dec!(123.45)).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, parsed);
    }

    #[test]
    fn test_serde_rejects_negative() {
        let result: Result<Amount, _> = serde_json::from_str("\"-5.00\"");
        assert!(result.is_err());
    }
}
