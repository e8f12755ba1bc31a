//! Persisted shape of a price list
//!
//! Strategies are stored as a discriminator plus a JSON body. Decoding goes
//! through one explicit table from [`StrategyKind`] to the variant type, so
//! adding a variant without teaching the table about it fails to compile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use core_kernel::{ActorId, AuditStamp, Currency, ItemId, PriceListId};

use crate::error::PricingError;
use crate::lifecycle::LifecycleState;
use crate::price_list::{PriceList, PriceListParts, PriceListReference, PriceTable};
use crate::strategy::{
    FixedPrice, NonePrice, PricingStrategy, ScaledPrice, StrategyKind, TieredGraduatedPrice,
    TieredVolumePrice,
};

impl StrategyKind {
    /// Builds the strategy stored under this discriminator
    ///
    /// # Errors
    ///
    /// Returns a validation error if the body does not decode into the
    /// variant, breaks its invariants, or decodes into a different kind
    pub fn decode(self, body: Value) -> Result<PricingStrategy, PricingError> {
        let strategy = match self {
            StrategyKind::Fixed => PricingStrategy::Fixed(decode_body::<FixedPrice>(self, body)?),
            StrategyKind::Scaled | StrategyKind::ScaledInteger => {
                PricingStrategy::Scaled(decode_body::<ScaledPrice>(self, body)?)
            }
            StrategyKind::TieredGraduated | StrategyKind::TieredGraduatedInteger => {
                PricingStrategy::Graduated(decode_body::<TieredGraduatedPrice>(self, body)?)
            }
            StrategyKind::TieredVolume | StrategyKind::TieredVolumeInteger => {
                PricingStrategy::Volume(decode_body::<TieredVolumePrice>(self, body)?)
            }
            StrategyKind::None => PricingStrategy::None(decode_body::<NonePrice>(self, body)?),
        };

        strategy.validate()?;
        if strategy.kind() != self {
            return Err(PricingError::validation(format!(
                "record declares {} but holds a {} strategy",
                self,
                strategy.kind()
            )));
        }
        Ok(strategy)
    }
}

fn decode_body<T: serde::de::DeserializeOwned>(
    kind: StrategyKind,
    body: Value,
) -> Result<T, PricingError> {
    serde_json::from_value(body)
        .map_err(|e| PricingError::validation(format!("cannot decode {} strategy: {}", kind, e)))
}

/// Discriminator and JSON body of a strategy
pub fn encode_strategy(strategy: &PricingStrategy) -> Result<(StrategyKind, Value), PricingError> {
    let body = match strategy {
        PricingStrategy::Fixed(s) => serde_json::to_value(s),
        PricingStrategy::Scaled(s) => serde_json::to_value(s),
        PricingStrategy::Graduated(s) => serde_json::to_value(s),
        PricingStrategy::Volume(s) => serde_json::to_value(s),
        PricingStrategy::None(s) => serde_json::to_value(s),
    }
    .map_err(|e| PricingError::validation(format!("cannot encode strategy: {}", e)))?;
    Ok((strategy.kind(), body))
}

/// One stored price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntryRecord {
    pub target_id: ItemId,
    pub currency: Currency,
    pub strategy_type: StrategyKind,
    pub strategy: Value,
}

/// Complete stored state of a price list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListSnapshot {
    pub id: PriceListId,
    pub reference: String,
    pub strategy_boundary: StrategyKind,
    pub version: u64,
    pub active: bool,
    pub archived: bool,
    pub soft_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: ActorId,
    pub last_modified_at: DateTime<Utc>,
    pub last_modified_by: ActorId,
    pub entries: Vec<PriceEntryRecord>,
}

impl PriceListSnapshot {
    /// Captures the current state of `list`
    pub fn capture(list: &PriceList) -> Result<Self, PricingError> {
        let mut entries = Vec::with_capacity(list.price_count());
        for (target_id, by_currency) in list.price_table() {
            for (currency, strategy) in by_currency {
                let (strategy_type, body) = encode_strategy(&strategy)?;
                entries.push(PriceEntryRecord {
                    target_id,
                    currency,
                    strategy_type,
                    strategy: body,
                });
            }
        }

        let lifecycle = list.lifecycle();
        let audit = list.audit();
        Ok(Self {
            id: list.id(),
            reference: list.reference().to_string(),
            strategy_boundary: list.strategy_boundary(),
            version: list.version(),
            active: lifecycle.is_active(),
            archived: lifecycle.is_archived(),
            soft_deleted: lifecycle.is_soft_deleted(),
            created_at: audit.created_at(),
            created_by: audit.created_by(),
            last_modified_at: audit.last_modified_at(),
            last_modified_by: audit.last_modified_by(),
            entries,
        })
    }

    /// Rebuilds the aggregate, re-checking every invariant
    pub fn restore(self) -> Result<PriceList, PricingError> {
        let mut prices = PriceTable::new();
        for entry in self.entries {
            let strategy = entry.strategy_type.decode(entry.strategy)?;
            let row: &mut BTreeMap<Currency, PricingStrategy> =
                prices.entry(entry.target_id).or_default();
            if row.insert(entry.currency, strategy).is_some() {
                return Err(PricingError::validation(format!(
                    "duplicate price for target {} in {}",
                    entry.target_id, entry.currency
                )));
            }
        }

        PriceList::reconstitute(PriceListParts {
            id: self.id,
            reference: PriceListReference::new(self.reference)?,
            strategy_boundary: self.strategy_boundary,
            version: self.version,
            lifecycle: LifecycleState::restore(self.active, self.archived, self.soft_deleted),
            audit: AuditStamp::restore(
                self.created_at,
                self.created_by,
                self.last_modified_at,
                self.last_modified_by,
            ),
            prices,
        })
    }
}
