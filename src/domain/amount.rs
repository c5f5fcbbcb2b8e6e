//! Amount type
//!
//! Monetary values and the numeric policy applied to stored balances.
//! Balances are kept with exactly two fraction digits, truncated toward zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fraction digits kept on every stored balance
pub const FRACTION_DIGITS: u32 = 2;

/// Truncate a value toward zero to exactly two fraction digits.
///
/// `10.129` becomes `10.12`, `-0.019` becomes `-0.01` and `10` becomes `10.00`.
pub fn truncate_to_cents(value: Decimal) -> Decimal {
    let mut truncated = value.round_dp_with_strategy(FRACTION_DIGITS, RoundingStrategy::ToZero);
    truncated.rescale(FRACTION_DIGITS);
    truncated
}

/// Amount represents a requested monetary value.
///
/// # Invariants
/// - Value is never negative (zero is allowed, it is how balances get reset)
///
/// Precision is not limited here: the ledger truncates when it stores.
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use total_economy::domain::Amount;
///
/// let amount: Amount = "12.345".parse().unwrap();
/// assert_eq!(amount.value(), Decimal::new(12345, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must not be negative (got {0})")]
    Negative(Decimal),

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::Negative` if value < 0
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }

        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal =
            Decimal::from_str(s.trim()).map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::from_str(&value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_truncate_rounds_toward_zero() {
        assert_eq!(truncate_to_cents(dec!(10.129)), dec!(10.12));
        assert_eq!(truncate_to_cents(dec!(10.999)), dec!(10.99));
        assert_eq!(truncate_to_cents(dec!(-0.019)), dec!(-0.01));
    }

    #[test]
    fn test_truncate_pads_to_two_digits() {
        let value = truncate_to_cents(dec!(10));
        assert_eq!(value.scale(), 2);
        assert_eq!(value.to_string(), "10.00");

        let value = truncate_to_cents(dec!(0.5));
        assert_eq!(value.to_string(), "0.50");
    }

    #[test]
    fn test_amount_zero_allowed() {
        let amount = Amount::new(Decimal::ZERO).unwrap();
        assert_eq!(amount, Amount::zero());
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = Amount::new(dec!(-1.50));
        assert!(matches!(amount, Err(AmountError::Negative(_))));
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Amount = " 123.456 ".parse().unwrap();
        assert_eq!(amount.value(), dec!(123.456));

        let bad: Result<Amount, _> = "twelve".parse();
        assert!(matches!(bad, Err(AmountError::ParseError(_))));
    }

    #[test]
    fn test_amount_serde_as_string() {
        let amount: Amount = serde_json::from_str(r#""7.25""#).unwrap();
        assert_eq!(amount.value(), dec!(7.25));
        assert_eq!(serde_json::to_string(&amount).unwrap(), r#""7.25""#);

        let negative: Result<Amount, _> = serde_json::from_str(r#""-3""#);
        assert!(negative.is_err());
    }
}
