//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency codes a trip or an expense can be denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    VND,
    USD,
    EUR,
    JPY,
    KRW,
    THB,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::VND | Currency::JPY | Currency::KRW => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::VND => "₫",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::JPY => "¥",
            Currency::KRW => "₩",
            Currency::THB => "฿",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::VND => "VND",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::JPY => "JPY",
            Currency::KRW => "KRW",
            Currency::THB => "THB",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::VND
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VND" => Ok(Currency::VND),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "JPY" => Ok(Currency::JPY),
            "KRW" => Ok(Currency::KRW),
            "THB" => Ok(Currency::THB),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Invalid exchange rate: {0}")]
    InvalidExchangeRate(Decimal),

    #[error("Converting {amount} at rate {rate} exceeds the decimal range")]
    ConversionOverflow { amount: Decimal, rate: Decimal },
}

/// A monetary amount with associated currency
///
/// Amounts are stored with 4 decimal places internally so that converted
/// values keep enough precision before trip-level rounding is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Value of this amount in another currency at a supplied rate
    ///
    /// The rate is never looked up here; callers bring the rate that was
    /// recorded alongside the amount. The result is not rounded so that sums
    /// of converted amounts stay exact.
    pub fn convert(&self, rate: Decimal) -> Result<Decimal, MoneyError> {
        if rate <= Decimal::ZERO {
            return Err(MoneyError::InvalidExchangeRate(rate));
        }
        self.amount
            .checked_mul(rate)
            .ok_or(MoneyError::ConversionOverflow {
                amount: self.amount,
                rate,
            })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50), Currency::USD);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::USD);
    }

    #[test]
    fn test_convert_overflow_is_an_error() {
        let usd = Money::new(dec!(100000000000000000000), Currency::USD);
        assert!(matches!(
            usd.convert(dec!(25000000000)),
            Err(MoneyError::ConversionOverflow { .. })
        ));
    }

    #[test]
    fn test_convert_at_rate() {
        let usd = Money::new(dec!(12.50), Currency::USD);
        assert_eq!(usd.convert(dec!(25000)).unwrap(), dec!(312500));
    }

    #[test]
    fn test_convert_rejects_non_positive_rate() {
        let usd = Money::new(dec!(12.50), Currency::USD);
        assert_eq!(
            usd.convert(Decimal::ZERO),
            Err(MoneyError::InvalidExchangeRate(Decimal::ZERO))
        );
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("thb".parse::<Currency>().unwrap(), Currency::THB);
        assert!("GBP".parse::<Currency>().is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn conversion_at_unit_rate_is_identity(minor in 1i64..1_000_000_000i64) {
            let money = Money::new(Decimal::new(minor, 2), Currency::USD);
            prop_assert_eq!(money.convert(Decimal::ONE).unwrap(), money.amount());
        }

        #[test]
        fn conversion_errors_instead_of_overflowing(amount in 1i64..i64::MAX, rate in 1i64..i64::MAX) {
            let money = Money::new(Decimal::from(amount), Currency::USD);
            let rate = Decimal::from(rate);
            match money.convert(rate) {
                Ok(value) => prop_assert_eq!(value / rate, money.amount()),
                Err(e) => prop_assert!(matches!(e, MoneyError::ConversionOverflow { .. }), "unexpected error: {:?}", e),
            }
        }
    }
}
