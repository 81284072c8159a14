//! Amount type for handling non-negative monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a dollar sign and thousands separators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Represents a non-negative currency amount (Mexican pesos in practice).
///
/// Every way to build an `Amount` from outside data (`FromStr`, `TryFrom<Decimal>`,
/// deserialization) rejects negative values, values with more than two decimals and values
/// above [`Amount::MAX`]. Sums of amounts are therefore exact to the cent.
///
/// # Examples
///
/// ```
/// # use bibliopay::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "$1,250.50");
/// assert_eq!(amount.plain(), "$1250.50");
/// assert!(Amount::from_str("-3").is_err());
/// assert!(Amount::from_str("abc").is_err());
/// assert!(Amount::from_str("1.005").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// The largest single amount accepted: 999,999,999,999.99.
    pub const MAX: Amount = Amount(Decimal::from_parts(276_447_231, 23_283, 0, false, 2));

    /// Cents are the smallest unit.
    pub const SCALE: u32 = 2;

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The amount as an `f64`, for the spreadsheet export.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Two decimals, a dollar sign and no thousands separators, e.g. `$1250.50`.
    pub fn plain(&self) -> String {
        format!("${}", self.cents_text())
    }

    /// The value in cents precision as `1234.50`, with no thousands separators.
    fn cents_text(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointNearestEven);
        format!("{:.2}", rounded)
    }
}

/// Inserts `,` between every group of three integer digits of `1234567.89`.
fn group_thousands(text: &str) -> String {
    let (int, frac) = text.split_once('.').unwrap_or((text, ""));
    let mut grouped = String::with_capacity(text.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if !frac.is_empty() {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// An error that can occur when turning outside data into an `Amount`.
pub enum AmountError {
    /// The text was empty.
    Empty,
    /// The text was not a number.
    Parse(rust_decimal::Error),
    /// The value was below zero.
    Negative(Decimal),
    /// The value had fractions of a cent.
    Precision(Decimal),
    /// The value was above `Amount::MAX`.
    TooLarge(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "An amount is required"),
            AmountError::Parse(e) => write!(f, "The amount is not a number: {e}"),
            AmountError::Negative(d) => write!(f, "The amount cannot be negative, got {d}"),
            AmountError::Precision(d) => {
                write!(f, "The amount cannot have more than two decimals, got {d}")
            }
            AmountError::TooLarge(d) => {
                write!(f, "The amount cannot be more than {}, got {d}", Amount::MAX)
            }
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmountError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        if value.normalize().scale() > Amount::SCALE {
            return Err(AmountError::Precision(value));
        }
        if value > Amount::MAX.0 {
            return Err(AmountError::TooLarge(value));
        }
        Ok(Amount(value.abs()))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        let without_dollar = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let without_commas = without_dollar.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError::Parse)?;
        Amount::try_from(value)
    }
}

impl Display for Amount {
    /// Dollar sign, thousands separators and two decimals, e.g. `$60,000.00`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "${}", group_thousands(&self.cents_text()))
    }
}

impl Add for Amount {
    type Output = Amount;

    /// Saturates at `Decimal::MAX` instead of overflowing.
    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Accepts a JSON string (`"15.50"`) or a JSON number (`15.5`). Snapshots written by older
    /// versions of the dashboard store plain numbers.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a non-negative amount as a number or a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Amount::from_str(v).map_err(E::custom)
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Amount::try_from(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Amount::try_from(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        if !v.is_finite() {
            return Err(E::custom(format!("The amount must be finite, got {v}")));
        }
        // The shortest round-trip representation of the float, e.g. 15.5 rather than
        // 15.4999999999999982236431605997495353221893310546875.
        Amount::from_str(&v.to_string()).map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_dollar_sign() {
        let amount = Amount::from_str("$50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_with_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_whitespace() {
        let amount = Amount::from_str("  15.5  ").unwrap();
        assert_eq!(amount.value(), dec("15.5"));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!(matches!(
            Amount::from_str("quince"),
            Err(AmountError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(Amount::from_str("   "), Err(AmountError::Empty)));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(matches!(
            Amount::from_str("-$5.00"),
            Err(AmountError::Negative(_))
        ));
    }

    #[test]
    fn test_negative_zero_is_accepted() {
        assert!(Amount::from_str("-0").unwrap().is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_str("60000").unwrap().to_string(), "$60,000.00");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
        assert_eq!(Amount::from_str("15.5").unwrap().plain(), "$15.50");
    }

    #[test]
    fn test_display_large_amount_is_exact() {
        let amount = Amount::from_str("999999999999.99").unwrap();
        assert_eq!(amount, Amount::MAX);
        assert_eq!(amount.to_string(), "$999,999,999,999.99");
        assert_eq!(amount.plain(), "$999999999999.99");
        assert_eq!(Amount::from_str("100").unwrap().to_string(), "$100.00");
        assert_eq!(Amount::from_str("1000.1").unwrap().to_string(), "$1,000.10");
    }

    #[test]
    fn test_parse_rejects_fractions_of_a_cent() {
        assert!(matches!(
            Amount::from_str("1.005"),
            Err(AmountError::Precision(_))
        ));
        assert!(matches!(
            Amount::from_str("2.675"),
            Err(AmountError::Precision(_))
        ));
        // Trailing zeros are not extra precision.
        assert_eq!(Amount::from_str("15.500").unwrap().plain(), "$15.50");
    }

    #[test]
    fn test_parse_rejects_above_max() {
        assert!(matches!(
            Amount::from_str("1000000000000"),
            Err(AmountError::TooLarge(_))
        ));
        assert!(matches!(
            Amount::from_str("79228162514264337593543950335"),
            Err(AmountError::TooLarge(_))
        ));
        assert!(serde_json::from_str::<Amount>("1000000000000").is_err());
        assert!(serde_json::from_str::<Amount>("\"79228162514264337593543950335\"").is_err());
    }

    #[test]
    fn test_sum_of_max_amounts_is_exact() {
        let total: Amount = std::iter::repeat(Amount::MAX).take(1000).sum();
        assert_eq!(total.value(), dec("999999999999990.00"));
        assert_eq!(total.to_string(), "$999,999,999,999,990.00");
    }

    #[test]
    fn test_add_saturates() {
        let huge = Amount(Decimal::MAX);
        assert_eq!((huge + Amount::MAX).value(), Decimal::MAX);
    }

    #[test]
    fn test_sum() {
        let total: Amount = ["15.50", "45.00", "120"]
            .iter()
            .map(|s| Amount::from_str(s).unwrap())
            .sum();
        assert_eq!(total.value(), dec("180.50"));
    }

    #[test]
    fn test_serialize_as_string() {
        let amount = Amount::from_str("15.50").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"15.50\"");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Amount = serde_json::from_str("15.5").unwrap();
        let b: Amount = serde_json::from_str("\"15.50\"").unwrap();
        let c: Amount = serde_json::from_str("45").unwrap();
        assert_eq!(a, b);
        assert_eq!(c.value(), dec("45"));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Amount>("-1.25").is_err());
        assert!(serde_json::from_str::<Amount>("-3").is_err());
    }
}
