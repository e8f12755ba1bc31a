//! Money types with precise decimal arithmetic
//!
//! Prices in the catalog are non-negative and carry an explicit precision.
//! Amounts are always stored already rounded to that precision using
//! round-half-up, so two `Money` values with equal fields are equal prices.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rounding applied to every amount: half away from zero, i.e. round-half-up
/// for the non-negative amounts money can hold.
pub const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CHF,
    PLN,
    SEK,
    CZK,
    CAD,
    AUD,
}

impl Currency {
    /// All supported currencies
    pub const ALL: [Currency; 10] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CHF,
        Currency::PLN,
        Currency::SEK,
        Currency::CZK,
        Currency::CAD,
        Currency::AUD,
    ];

    /// Number of minor-unit digits (e.g. 2 for cents)
    pub fn minor_units(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::PLN => "PLN",
            Currency::SEK => "SEK",
            Currency::CZK => "CZK",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
        }
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
        let code = s.trim().to_ascii_uppercase();
        Currency::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or(MoneyError::UnknownCurrency(s.to_string()))
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Precision {precision} is below the {minor_units} minor units of {currency}")]
    InsufficientPrecision {
        currency: String,
        precision: u32,
        minor_units: u32,
    },

    #[error("Precision {precision} exceeds the maximum decimal scale of {max}")]
    ExcessivePrecision { precision: u32, max: u32 },

    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A non-negative monetary amount with currency and precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMoney", into = "RawMoney")]
pub struct Money {
    amount: Decimal,
    currency: Currency,
    precision: u32,
}

impl Money {
    /// Largest scale a `Decimal` can carry
    pub const MAX_PRECISION: u32 = 28;

    /// Creates money at the currency's standard precision
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        Self::with_precision(amount, currency, currency.minor_units())
    }

    /// Creates money with an explicit precision
    ///
    /// # Errors
    ///
    /// Fails if the amount is negative, the precision is below the
    /// currency's minor units, or it exceeds [`Money::MAX_PRECISION`].
    pub fn with_precision(
        amount: Decimal,
        currency: Currency,
        precision: u32,
    ) -> Result<Self, MoneyError> {
        if precision > Self::MAX_PRECISION {
            return Err(MoneyError::ExcessivePrecision {
                precision,
                max: Self::MAX_PRECISION,
            });
        }
        if precision < currency.minor_units() {
            return Err(MoneyError::InsufficientPrecision {
                currency: currency.to_string(),
                precision,
                minor_units: currency.minor_units(),
            });
        }
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::InvalidAmount(format!(
                "amount must not be negative, got {}",
                amount
            )));
        }
        let amount = if amount.is_zero() { Decimal::ZERO } else { amount };
        let mut scaled = amount.round_dp_with_strategy(precision, ROUNDING);
        scaled.rescale(precision);
        Ok(Self {
            amount: scaled,
            currency,
            precision,
        })
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self::zero_with_precision(currency, currency.minor_units())
    }

    /// Creates a zero amount at the given precision, clamped into the
    /// currency's minor units and [`Money::MAX_PRECISION`]
    pub fn zero_with_precision(currency: Currency, precision: u32) -> Self {
        let precision = precision
            .max(currency.minor_units())
            .min(Self::MAX_PRECISION);
        let mut amount = dec!(0);
        amount.rescale(precision);
        Self {
            amount,
            currency,
            precision,
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

    /// Returns the number of decimal places the amount is kept at
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Builds a value in the same currency and precision from an unrounded
    /// amount. This is the single rounding point of every calculation.
    pub fn rounded(&self, raw_amount: Decimal) -> Result<Self, MoneyError> {
        Self::with_precision(raw_amount, self.currency, self.precision)
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let sum = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Self::with_precision(sum, self.currency, self.precision.max(other.precision))
    }

    /// Multiplies by a non-negative factor and re-rounds to this precision
    pub fn multiply(&self, factor: Decimal) -> Result<Self, MoneyError> {
        let product = self
            .amount
            .checked_mul(factor)
            .ok_or(MoneyError::Overflow)?;
        self.rounded(product)
    }

    /// Returns an error unless both values share a currency
    pub fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.partial_cmp(&other.amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency.code())
    }
}

/// Serialized form; deserialization re-validates through `Money::with_precision`
#[derive(Serialize, Deserialize)]
struct RawMoney {
    amount: Decimal,
    currency: Currency,
    precision: u32,
}

impl TryFrom<RawMoney> for Money {
    type Error = MoneyError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Money::with_precision(raw.amount, raw.currency, raw.precision)
    }
}

impl From<Money> for RawMoney {
    fn from(money: Money) -> Self {
        RawMoney {
            amount: money.amount,
            currency: money.currency,
            precision: money.precision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50), Currency::USD).unwrap();
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::USD);
        assert_eq!(m.precision(), 2);
    }

    #[test]
    fn test_rounds_half_up() {
        let m = Money::new(dec!(10.005), Currency::EUR).unwrap();
        assert_eq!(m.amount(), dec!(10.01));

        let m = Money::new(dec!(10.004), Currency::EUR).unwrap();
        assert_eq!(m.amount(), dec!(10.00));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let result = Money::new(dec!(-0.01), Currency::USD);
        assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));
    }

    #[test]
    fn test_precision_below_minor_units_rejected() {
        let result = Money::with_precision(dec!(1), Currency::USD, 1);
        assert!(matches!(result, Err(MoneyError::InsufficientPrecision { .. })));

        assert!(Money::with_precision(dec!(1), Currency::JPY, 0).is_ok());
    }

    #[test]
    fn test_precision_beyond_decimal_scale_rejected() {
        let result = Money::with_precision(dec!(1.5), Currency::USD, 40);
        assert_eq!(
            result,
            Err(MoneyError::ExcessivePrecision { precision: 40, max: 28 })
        );

        let widest = Money::with_precision(dec!(1.5), Currency::USD, 28).unwrap();
        assert_eq!(widest.amount().scale(), 28);
        assert_eq!(Money::zero_with_precision(Currency::USD, 40).precision(), 28);
    }

    #[test]
    fn test_stored_money_with_excessive_precision_does_not_decode() {
        let json = r#"{"amount":"1.50","currency":"USD","precision":40}"#;
        assert!(serde_json::from_str::<Money>(json).is_err());
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::new(dec!(100.00), Currency::USD).unwrap();
        let eur = Money::new(dec!(100.00), Currency::EUR).unwrap();

        let result = usd.checked_add(&eur);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
        assert!(usd.partial_cmp(&eur).is_none());
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("pln".parse::<Currency>().unwrap(), Currency::PLN);
        assert!("XXX".parse::<Currency>().is_err());
    }

    #[test]
    fn test_extended_precision_is_kept() {
        let m = Money::with_precision(dec!(0.12345), Currency::USD, 4).unwrap();
        assert_eq!(m.amount(), dec!(0.1235));
        assert_eq!(m.to_string(), "0.1235 USD");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn amount_is_always_scaled_to_precision(
            minor in 0i64..1_000_000_000i64,
            scale in 0u32..8u32,
            precision in 2u32..6u32
        ) {
            let m = Money::with_precision(Decimal::new(minor, scale), Currency::USD, precision).unwrap();
            prop_assert_eq!(m.amount().scale(), precision);
        }

        #[test]
        fn serde_preserves_value(minor in 0i64..1_000_000_000i64) {
            let m = Money::new(Decimal::new(minor, 2), Currency::GBP).unwrap();
            let json = serde_json::to_string(&m).unwrap();
            let back: Money = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(m, back);
        }
    }
}
