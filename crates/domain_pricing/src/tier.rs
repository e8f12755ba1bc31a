//! Quantity tiers for graduated and volume pricing
//!
//! A [`TierSchedule`] is an ordered list of quantity buckets. Graduated
//! pricing bills each bucket's slice of the quantity at that bucket's rate;
//! volume pricing picks one bucket and bills the whole quantity at its rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError};

use crate::error::PricingError;

/// Whether a strategy prices continuous quantities or whole units only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    Fractional,
    Integer,
}

impl QuantityKind {
    /// Clamps negative quantities to zero and floors for integer pricing
    pub fn normalize(&self, quantity: Decimal) -> Decimal {
        let clamped = quantity.max(Decimal::ZERO);
        match self {
            QuantityKind::Fractional => clamped,
            QuantityKind::Integer => clamped.floor(),
        }
    }
}

/// One quantity range `[min_quantity, max_quantity)` and its unit rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBucket {
    min_quantity: Decimal,
    max_quantity: Option<Decimal>,
    price_per_unit: Money,
}

impl TierBucket {
    /// Creates a bucket; `max_quantity = None` means unbounded
    pub fn new(
        min_quantity: Decimal,
        max_quantity: Option<Decimal>,
        price_per_unit: Money,
    ) -> Result<Self, PricingError> {
        let bucket = Self {
            min_quantity,
            max_quantity,
            price_per_unit,
        };
        bucket.validate()?;
        Ok(bucket)
    }

    /// Bounded bucket helper
    pub fn bounded(min: Decimal, max: Decimal, price_per_unit: Money) -> Result<Self, PricingError> {
        Self::new(min, Some(max), price_per_unit)
    }

    /// Open-ended bucket helper
    pub fn open(min: Decimal, price_per_unit: Money) -> Result<Self, PricingError> {
        Self::new(min, None, price_per_unit)
    }

    pub fn min_quantity(&self) -> Decimal {
        self.min_quantity
    }

    pub fn max_quantity(&self) -> Option<Decimal> {
        self.max_quantity
    }

    pub fn price_per_unit(&self) -> Money {
        self.price_per_unit
    }

    /// True if `quantity` falls in `[min, max)`
    pub fn contains(&self, quantity: Decimal) -> bool {
        quantity >= self.min_quantity && self.max_quantity.map_or(true, |max| quantity < max)
    }

    fn validate(&self) -> Result<(), PricingError> {
        if self.min_quantity.is_sign_negative() && !self.min_quantity.is_zero() {
            return Err(PricingError::validation(format!(
                "tier minimum must not be negative, got {}",
                self.min_quantity
            )));
        }
        if let Some(max) = self.max_quantity {
            if max <= self.min_quantity {
                return Err(PricingError::validation(format!(
                    "tier maximum {} must be greater than minimum {}",
                    max, self.min_quantity
                )));
            }
        }
        Ok(())
    }
}

/// Non-empty, ascending list of contiguous buckets
///
/// Each bucket starts exactly where the previous one ends, and only the last
/// bucket may be open-ended. All rates share one currency and precision.
/// The first bucket may start above zero: graduated pricing bills nothing
/// below it, volume pricing bills such quantities at the first rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TierBucket>", into = "Vec<TierBucket>")]
pub struct TierSchedule {
    buckets: Vec<TierBucket>,
}

impl TierSchedule {
    pub fn new(buckets: Vec<TierBucket>) -> Result<Self, PricingError> {
        let first = buckets
            .first()
            .ok_or_else(|| PricingError::validation("tier schedule must contain at least one bucket"))?;
        let currency = first.price_per_unit.currency();
        let precision = first.price_per_unit.precision();

        for (index, bucket) in buckets.iter().enumerate() {
            bucket.validate()?;

            let rate = bucket.price_per_unit;
            if rate.currency() != currency {
                return Err(PricingError::CurrencyMismatch {
                    expected: currency.to_string(),
                    actual: rate.currency().to_string(),
                });
            }
            if rate.precision() != precision {
                return Err(PricingError::validation(format!(
                    "tier {} has precision {}, expected {}",
                    index,
                    rate.precision(),
                    precision
                )));
            }

            if let Some(next) = buckets.get(index + 1) {
                let max = bucket.max_quantity.ok_or_else(|| {
                    PricingError::validation(format!(
                        "only the last tier may be open-ended, tier {} is not last",
                        index
                    ))
                })?;
                if next.min_quantity < max {
                    return Err(PricingError::validation(format!(
                        "tier {} starts at {} which overlaps tier {} ending at {}",
                        index + 1,
                        next.min_quantity,
                        index,
                        max
                    )));
                }
                if next.min_quantity > max {
                    return Err(PricingError::validation(format!(
                        "tier {} starts at {}, leaving a gap after tier {} ending at {}",
                        index + 1,
                        next.min_quantity,
                        index,
                        max
                    )));
                }
            }
        }

        Ok(Self { buckets })
    }

    pub fn buckets(&self) -> &[TierBucket] {
        &self.buckets
    }

    pub fn currency(&self) -> Currency {
        self.buckets[0].price_per_unit.currency()
    }

    /// Zero in the schedule's currency and precision, the rounding template
    /// for every total computed over this schedule
    pub fn zero(&self) -> Money {
        let rate = self.buckets[0].price_per_unit;
        Money::zero_with_precision(rate.currency(), rate.precision())
    }

    /// Marginal total: each bucket bills the slice of `quantity` inside it.
    /// Quantity past the last bucket's maximum is billed at the last rate.
    /// Returns the unrounded amount.
    pub fn graduated_total(&self, quantity: Decimal) -> Result<Decimal, MoneyError> {
        let last = self.buckets.len() - 1;
        let mut total = Decimal::ZERO;

        for (index, bucket) in self.buckets.iter().enumerate() {
            if quantity <= bucket.min_quantity {
                break;
            }
            let upper = match bucket.max_quantity {
                Some(max) if index != last => max.min(quantity),
                _ => quantity,
            };
            let slice = upper - bucket.min_quantity;
            let charge = slice
                .checked_mul(bucket.price_per_unit.amount())
                .ok_or(MoneyError::Overflow)?;
            total = total.checked_add(charge).ok_or(MoneyError::Overflow)?;
        }

        Ok(total)
    }

    /// Bucket whose rate applies to the whole quantity under volume pricing:
    /// the bucket containing `quantity`, the last one past every bounded
    /// maximum, the first one below every minimum
    pub fn volume_bucket(&self, quantity: Decimal) -> &TierBucket {
        let first = &self.buckets[0];
        if quantity < first.min_quantity {
            return first;
        }
        self.buckets
            .iter()
            .find(|bucket| bucket.contains(quantity))
            .unwrap_or(&self.buckets[self.buckets.len() - 1])
    }

    /// Volume total, unrounded
    pub fn volume_total(&self, quantity: Decimal) -> Result<Decimal, MoneyError> {
        quantity
            .checked_mul(self.volume_bucket(quantity).price_per_unit.amount())
            .ok_or(MoneyError::Overflow)
    }

    /// Copy with every rate multiplied by `factor` and re-rounded
    pub fn scaled(&self, factor: Decimal) -> Result<Self, PricingError> {
        let buckets = self
            .buckets
            .iter()
            .map(|bucket| -> Result<TierBucket, PricingError> {
                Ok(TierBucket {
                    min_quantity: bucket.min_quantity,
                    max_quantity: bucket.max_quantity,
                    price_per_unit: bucket.price_per_unit.multiply(factor)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { buckets })
    }
}

impl TryFrom<Vec<TierBucket>> for TierSchedule {
    type Error = PricingError;

    fn try_from(buckets: Vec<TierBucket>) -> Result<Self, Self::Error> {
        TierSchedule::new(buckets)
    }
}

impl From<TierSchedule> for Vec<TierBucket> {
    fn from(schedule: TierSchedule) -> Self {
        schedule.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD).unwrap()
    }

    fn two_tiers() -> TierSchedule {
        TierSchedule::new(vec![
            TierBucket::bounded(dec!(0), dec!(10), usd(dec!(5))).unwrap(),
            TierBucket::open(dec!(10), usd(dec!(4))).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_schedule_rejected() {
        assert!(matches!(TierSchedule::new(vec![]), Err(PricingError::Validation(_))));
    }

    #[test]
    fn test_open_bucket_must_be_last() {
        let result = TierSchedule::new(vec![
            TierBucket::open(dec!(0), usd(dec!(5))).unwrap(),
            TierBucket::open(dec!(10), usd(dec!(4))).unwrap(),
        ]);
        assert!(matches!(result, Err(PricingError::Validation(_))));
    }

    #[test]
    fn test_overlap_rejected() {
        let result = TierSchedule::new(vec![
            TierBucket::bounded(dec!(0), dec!(10), usd(dec!(5))).unwrap(),
            TierBucket::open(dec!(9), usd(dec!(4))).unwrap(),
        ]);
        assert!(matches!(result, Err(PricingError::Validation(_))));
    }

    #[test]
    fn test_gap_between_tiers_rejected() {
        let result = TierSchedule::new(vec![
            TierBucket::bounded(dec!(0), dec!(10), usd(dec!(5))).unwrap(),
            TierBucket::open(dec!(20), usd(dec!(4))).unwrap(),
        ]);
        match result {
            Err(PricingError::Validation(message)) => assert!(message.contains("gap")),
            other => panic!("expected a gap to be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_gapped_schedule_does_not_deserialize() {
        let json = r#"[
            {"min_quantity":"0","max_quantity":"10","price_per_unit":{"amount":"5.00","currency":"USD","precision":2}},
            {"min_quantity":"20","max_quantity":null,"price_per_unit":{"amount":"4.00","currency":"USD","precision":2}}
        ]"#;
        assert!(serde_json::from_str::<TierSchedule>(json).is_err());
    }

    #[test]
    fn test_mixed_currency_rejected() {
        let result = TierSchedule::new(vec![
            TierBucket::bounded(dec!(0), dec!(10), usd(dec!(5))).unwrap(),
            TierBucket::open(dec!(10), Money::new(dec!(4), Currency::EUR).unwrap()).unwrap(),
        ]);
        assert!(matches!(result, Err(PricingError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_inverted_bucket_rejected() {
        assert!(TierBucket::bounded(dec!(5), dec!(5), usd(dec!(1))).is_err());
        assert!(TierBucket::open(dec!(-1), usd(dec!(1))).is_err());
    }

    #[test]
    fn test_graduated_total() {
        let schedule = two_tiers();
        assert_eq!(schedule.graduated_total(dec!(15)).unwrap(), dec!(70));
        assert_eq!(schedule.graduated_total(dec!(10)).unwrap(), dec!(50));
        assert_eq!(schedule.graduated_total(dec!(0)).unwrap(), dec!(0));
    }

    #[test]
    fn test_volume_total() {
        let schedule = two_tiers();
        assert_eq!(schedule.volume_total(dec!(15)).unwrap(), dec!(60));
        assert_eq!(schedule.volume_total(dec!(9.5)).unwrap(), dec!(47.5));
        assert_eq!(schedule.volume_total(dec!(10)).unwrap(), dec!(40));
        assert!(schedule.volume_bucket(dec!(15)).contains(dec!(15)));
        assert!(!schedule.buckets()[0].contains(dec!(10)));
    }

    #[test]
    fn test_bounded_last_bucket_extends_past_maximum() {
        let schedule = TierSchedule::new(vec![
            TierBucket::bounded(dec!(0), dec!(10), usd(dec!(2))).unwrap(),
            TierBucket::bounded(dec!(10), dec!(20), usd(dec!(1))).unwrap(),
        ])
        .unwrap();

        assert_eq!(schedule.graduated_total(dec!(25)).unwrap(), dec!(35));
        assert_eq!(schedule.volume_total(dec!(25)).unwrap(), dec!(25));
        assert_eq!(schedule.volume_bucket(dec!(25)), &schedule.buckets()[1]);
    }

    #[test]
    fn test_quantity_below_first_tier() {
        let schedule = TierSchedule::new(vec![
            TierBucket::open(dec!(5), usd(dec!(3))).unwrap(),
        ])
        .unwrap();

        assert_eq!(schedule.graduated_total(dec!(4)).unwrap(), dec!(0));
        assert_eq!(schedule.volume_total(dec!(4)).unwrap(), dec!(12));
        // graduated bills only the part above the first minimum
        assert_eq!(schedule.graduated_total(dec!(7)).unwrap(), dec!(6));
        assert_eq!(schedule.volume_total(dec!(7)).unwrap(), dec!(21));
    }

    #[test]
    fn test_integer_quantity_floors() {
        assert_eq!(QuantityKind::Integer.normalize(dec!(3.9)), dec!(3));
        assert_eq!(QuantityKind::Fractional.normalize(dec!(3.9)), dec!(3.9));
        assert_eq!(QuantityKind::Integer.normalize(dec!(-2)), dec!(0));
    }

    #[test]
    fn test_deserialization_validates() {
        let json = r#"[
            {"min_quantity":"0","max_quantity":null,"price_per_unit":{"amount":"1.00","currency":"USD","precision":2}},
            {"min_quantity":"5","max_quantity":null,"price_per_unit":{"amount":"1.00","currency":"USD","precision":2}}
        ]"#;
        assert!(serde_json::from_str::<TierSchedule>(json).is_err());
    }
}
