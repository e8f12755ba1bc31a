//! Pricing strategies
//!
//! A [`PricingStrategy`] turns a quantity into a [`Money`] amount. The set of
//! variants is closed: fixed, per-unit scaled, tiered graduated, tiered volume
//! and a zero "none" placeholder. Scaled and tiered strategies come in a
//! fractional and an integer flavor, and the flavor is part of the variant
//! identity ([`StrategyKind`]).
//!
//! Calculations accumulate in full precision and round once at the end, to
//! the precision of the strategy's own money values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Currency, Money, MoneyError};

use crate::error::PricingError;
use crate::tier::{QuantityKind, TierSchedule};

/// Quantity at which two strategies of the same kind are compared
pub const REFERENCE_QUANTITY: Decimal = Decimal::ONE;

/// Discriminator of a strategy variant, including its quantity flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Fixed,
    Scaled,
    ScaledInteger,
    TieredGraduated,
    TieredGraduatedInteger,
    TieredVolume,
    TieredVolumeInteger,
    None,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 8] = [
        StrategyKind::Fixed,
        StrategyKind::Scaled,
        StrategyKind::ScaledInteger,
        StrategyKind::TieredGraduated,
        StrategyKind::TieredGraduatedInteger,
        StrategyKind::TieredVolume,
        StrategyKind::TieredVolumeInteger,
        StrategyKind::None,
    ];

    /// Stable discriminator used in persisted records
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Fixed => "fixed",
            StrategyKind::Scaled => "scaled",
            StrategyKind::ScaledInteger => "scaled_integer",
            StrategyKind::TieredGraduated => "tiered_graduated",
            StrategyKind::TieredGraduatedInteger => "tiered_graduated_integer",
            StrategyKind::TieredVolume => "tiered_volume",
            StrategyKind::TieredVolumeInteger => "tiered_volume_integer",
            StrategyKind::None => "none",
        }
    }

    /// Quantity flavor, for the kinds that look at quantity at all
    pub fn quantity_kind(&self) -> Option<QuantityKind> {
        match self {
            StrategyKind::Scaled | StrategyKind::TieredGraduated | StrategyKind::TieredVolume => {
                Some(QuantityKind::Fractional)
            }
            StrategyKind::ScaledInteger
            | StrategyKind::TieredGraduatedInteger
            | StrategyKind::TieredVolumeInteger => Some(QuantityKind::Integer),
            StrategyKind::Fixed | StrategyKind::None => None,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PricingError::validation(format!("unknown strategy type '{}'", s)))
    }
}

/// Common behaviour of every strategy variant
pub trait PriceCalculator {
    /// Price for `quantity`, rounded once to the strategy's precision
    fn calculate(&self, quantity: Decimal) -> Result<Money, MoneyError>;

    /// Currency every amount of the strategy is denominated in
    fn currency(&self) -> Currency;
}

/// Flat price independent of quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPrice {
    pub price: Money,
}

impl FixedPrice {
    pub fn new(price: Money) -> Self {
        Self { price }
    }
}

impl PriceCalculator for FixedPrice {
    fn calculate(&self, _quantity: Decimal) -> Result<Money, MoneyError> {
        Ok(self.price)
    }

    fn currency(&self) -> Currency {
        self.price.currency()
    }
}

/// `base_price + rate_per_unit × quantity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaledPrice {
    pub base_price: Money,
    pub rate_per_unit: Money,
    pub quantity_kind: QuantityKind,
}

impl ScaledPrice {
    pub fn new(
        base_price: Money,
        rate_per_unit: Money,
        quantity_kind: QuantityKind,
    ) -> Result<Self, PricingError> {
        let price = Self {
            base_price,
            rate_per_unit,
            quantity_kind,
        };
        price.validate()?;
        Ok(price)
    }

    fn validate(&self) -> Result<(), PricingError> {
        self.base_price.ensure_same_currency(&self.rate_per_unit)?;
        if self.base_price.precision() != self.rate_per_unit.precision() {
            return Err(PricingError::validation(format!(
                "base price precision {} differs from rate precision {}",
                self.base_price.precision(),
                self.rate_per_unit.precision()
            )));
        }
        Ok(())
    }
}

impl PriceCalculator for ScaledPrice {
    fn calculate(&self, quantity: Decimal) -> Result<Money, MoneyError> {
        let quantity = self.quantity_kind.normalize(quantity);
        let variable = self
            .rate_per_unit
            .amount()
            .checked_mul(quantity)
            .ok_or(MoneyError::Overflow)?;
        let raw = self
            .base_price
            .amount()
            .checked_add(variable)
            .ok_or(MoneyError::Overflow)?;
        self.base_price.rounded(raw)
    }

    fn currency(&self) -> Currency {
        self.base_price.currency()
    }
}

/// Progressive pricing: every bucket bills its own slice of the quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredGraduatedPrice {
    pub schedule: TierSchedule,
    pub quantity_kind: QuantityKind,
}

impl TieredGraduatedPrice {
    pub fn new(schedule: TierSchedule, quantity_kind: QuantityKind) -> Self {
        Self {
            schedule,
            quantity_kind,
        }
    }
}

impl PriceCalculator for TieredGraduatedPrice {
    fn calculate(&self, quantity: Decimal) -> Result<Money, MoneyError> {
        let quantity = self.quantity_kind.normalize(quantity);
        let raw = self.schedule.graduated_total(quantity)?;
        self.schedule.zero().rounded(raw)
    }

    fn currency(&self) -> Currency {
        self.schedule.currency()
    }
}

/// Volume pricing: one bucket's rate applies to the whole quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredVolumePrice {
    pub schedule: TierSchedule,
    pub quantity_kind: QuantityKind,
}

impl TieredVolumePrice {
    pub fn new(schedule: TierSchedule, quantity_kind: QuantityKind) -> Self {
        Self {
            schedule,
            quantity_kind,
        }
    }
}

impl PriceCalculator for TieredVolumePrice {
    fn calculate(&self, quantity: Decimal) -> Result<Money, MoneyError> {
        let quantity = self.quantity_kind.normalize(quantity);
        let raw = self.schedule.volume_total(quantity)?;
        self.schedule.zero().rounded(raw)
    }

    fn currency(&self) -> Currency {
        self.schedule.currency()
    }
}

/// Zero price that only carries a currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonePrice {
    pub currency: Currency,
}

impl NonePrice {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }
}

impl PriceCalculator for NonePrice {
    fn calculate(&self, _quantity: Decimal) -> Result<Money, MoneyError> {
        Ok(Money::zero(self.currency))
    }

    fn currency(&self) -> Currency {
        self.currency
    }
}

/// Closed set of pricing strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingStrategy {
    Fixed(FixedPrice),
    Scaled(ScaledPrice),
    Graduated(TieredGraduatedPrice),
    Volume(TieredVolumePrice),
    None(NonePrice),
}

impl PricingStrategy {
    pub fn fixed(price: Money) -> Self {
        PricingStrategy::Fixed(FixedPrice::new(price))
    }

    pub fn scaled(
        base_price: Money,
        rate_per_unit: Money,
        quantity_kind: QuantityKind,
    ) -> Result<Self, PricingError> {
        Ok(PricingStrategy::Scaled(ScaledPrice::new(
            base_price,
            rate_per_unit,
            quantity_kind,
        )?))
    }

    pub fn graduated(schedule: TierSchedule, quantity_kind: QuantityKind) -> Self {
        PricingStrategy::Graduated(TieredGraduatedPrice::new(schedule, quantity_kind))
    }

    pub fn volume(schedule: TierSchedule, quantity_kind: QuantityKind) -> Self {
        PricingStrategy::Volume(TieredVolumePrice::new(schedule, quantity_kind))
    }

    pub fn none(currency: Currency) -> Self {
        PricingStrategy::None(NonePrice::new(currency))
    }

    /// Variant discriminator, used for the price list boundary
    pub fn kind(&self) -> StrategyKind {
        match self {
            PricingStrategy::Fixed(_) => StrategyKind::Fixed,
            PricingStrategy::Scaled(s) => match s.quantity_kind {
                QuantityKind::Fractional => StrategyKind::Scaled,
                QuantityKind::Integer => StrategyKind::ScaledInteger,
            },
            PricingStrategy::Graduated(s) => match s.quantity_kind {
                QuantityKind::Fractional => StrategyKind::TieredGraduated,
                QuantityKind::Integer => StrategyKind::TieredGraduatedInteger,
            },
            PricingStrategy::Volume(s) => match s.quantity_kind {
                QuantityKind::Fractional => StrategyKind::TieredVolume,
                QuantityKind::Integer => StrategyKind::TieredVolumeInteger,
            },
            PricingStrategy::None(_) => StrategyKind::None,
        }
    }

    fn calculator(&self) -> &dyn PriceCalculator {
        match self {
            PricingStrategy::Fixed(s) => s,
            PricingStrategy::Scaled(s) => s,
            PricingStrategy::Graduated(s) => s,
            PricingStrategy::Volume(s) => s,
            PricingStrategy::None(s) => s,
        }
    }

    pub fn currency(&self) -> Currency {
        self.calculator().currency()
    }

    /// Price for `quantity`; negative quantities price as zero
    pub fn calculate(&self, quantity: Decimal) -> Result<Money, MoneyError> {
        self.calculator().calculate(quantity)
    }

    /// Price at [`REFERENCE_QUANTITY`]
    pub fn reference_price(&self) -> Result<Money, MoneyError> {
        self.calculate(REFERENCE_QUANTITY)
    }

    /// Compares two strategies of the same kind and currency at the
    /// reference quantity
    pub fn is_more_expensive_than(&self, other: &PricingStrategy) -> Result<bool, PricingError> {
        if self.kind() != other.kind() {
            return Err(PricingError::StrategyMismatch {
                expected: self.kind(),
                actual: other.kind(),
            });
        }
        if self.currency() != other.currency() {
            return Err(PricingError::CurrencyMismatch {
                expected: self.currency().to_string(),
                actual: other.currency().to_string(),
            });
        }
        let mine = self.reference_price()?;
        let theirs = other.reference_price()?;
        Ok(mine.amount() > theirs.amount())
    }

    /// New strategy with every embedded amount multiplied by `factor` and
    /// re-rounded to its own precision
    pub fn adjusted_by(&self, factor: Decimal) -> Result<PricingStrategy, PricingError> {
        if factor.is_sign_negative() && !factor.is_zero() {
            return Err(PricingError::validation(format!(
                "adjustment factor must not be negative, got {}",
                factor
            )));
        }
        let adjusted = match self {
            PricingStrategy::Fixed(s) => PricingStrategy::fixed(s.price.multiply(factor)?),
            PricingStrategy::Scaled(s) => PricingStrategy::Scaled(ScaledPrice {
                base_price: s.base_price.multiply(factor)?,
                rate_per_unit: s.rate_per_unit.multiply(factor)?,
                quantity_kind: s.quantity_kind,
            }),
            PricingStrategy::Graduated(s) => {
                PricingStrategy::graduated(s.schedule.scaled(factor)?, s.quantity_kind)
            }
            PricingStrategy::Volume(s) => {
                PricingStrategy::volume(s.schedule.scaled(factor)?, s.quantity_kind)
            }
            PricingStrategy::None(s) => PricingStrategy::none(s.currency),
        };
        Ok(adjusted)
    }

    /// Re-checks variant invariants, used after decoding stored data
    pub fn validate(&self) -> Result<(), PricingError> {
        match self {
            PricingStrategy::Scaled(s) => s.validate(),
            // schedules are validated when built or deserialized
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PricingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind(), self.currency())
    }
}
