//! Bulk percentage adjustments

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// A percentage change applied to every price of a list at once
///
/// `percentage` lies in `(-100, 1000]`: prices can be cut to just above
/// zero or raised elevenfold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBulkAdjustment")]
pub struct BulkAdjustment {
    reason: String,
    percentage: Decimal,
}

impl BulkAdjustment {
    pub const MIN_PERCENTAGE_EXCLUSIVE: Decimal = dec!(-100);
    pub const MAX_PERCENTAGE: Decimal = dec!(1000);

    pub fn new(reason: impl Into<String>, percentage: Decimal) -> Result<Self, PricingError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(PricingError::MissingRequiredField("reason".to_string()));
        }
        if percentage <= Self::MIN_PERCENTAGE_EXCLUSIVE || percentage > Self::MAX_PERCENTAGE {
            return Err(PricingError::validation(format!(
                "adjustment percentage must be in (-100, 1000], got {}",
                percentage
            )));
        }
        Ok(Self {
            reason: reason.trim().to_string(),
            percentage,
        })
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn percentage(&self) -> Decimal {
        self.percentage
    }

    /// Multiplier applied to every amount, `1 + percentage / 100`
    pub fn factor(&self) -> Decimal {
        Decimal::ONE + self.percentage / dec!(100)
    }
}

/// Wire shape; decoding goes through [`BulkAdjustment::new`]
#[derive(Deserialize)]
struct RawBulkAdjustment {
    reason: String,
    percentage: Decimal,
}

impl TryFrom<RawBulkAdjustment> for BulkAdjustment {
    type Error = PricingError;

    fn try_from(raw: RawBulkAdjustment) -> Result<Self, Self::Error> {
        BulkAdjustment::new(raw.reason, raw.percentage)
    }
}
