//! PriceList Aggregate Root
//!
//! A price list maps catalog items to one pricing strategy per currency. It is
//! locked to a single [`StrategyKind`] (the strategy boundary) and every
//! stored strategy must be of that kind and denominated in the currency it is
//! stored under.
//!
//! # Invariants
//!
//! - Every strategy's kind equals the strategy boundary
//! - Every strategy's currency equals its currency key
//! - No target is kept with an empty currency map
//! - `version` grows by exactly one per mutating operation
//! - Price mutations require an active, non-deleted list

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

use core_kernel::{ActorId, AuditStamp, Currency, ItemId, Money, PriceListId};

use crate::adjustment::BulkAdjustment;
use crate::error::PricingError;
use crate::events::{LifecycleChange, PriceListEvent};
use crate::lifecycle::LifecycleState;
use crate::strategy::{PricingStrategy, StrategyKind};

/// Prices by target, then by currency
pub type PriceTable = BTreeMap<ItemId, BTreeMap<Currency, PricingStrategy>>;

/// Business reference of a price list, e.g. `EU-RETAIL-2024`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PriceListReference(String);

impl PriceListReference {
    pub const MAX_LEN: usize = 64;

    pub fn new(value: impl Into<String>) -> Result<Self, PricingError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(PricingError::MissingRequiredField("reference".to_string()));
        }
        if value.chars().count() > Self::MAX_LEN {
            return Err(PricingError::validation(format!(
                "reference must be at most {} characters",
                Self::MAX_LEN
            )));
        }
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(PricingError::validation(format!(
                "reference contains invalid character '{}'",
                bad
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PriceListReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PriceListReference {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PriceListReference::new(value)
    }
}

impl From<PriceListReference> for String {
    fn from(reference: PriceListReference) -> Self {
        reference.0
    }
}

/// The PriceList aggregate root
#[derive(Debug, Clone)]
pub struct PriceList {
    id: PriceListId,
    reference: PriceListReference,
    strategy_boundary: StrategyKind,
    version: u64,
    /// Version the list was loaded at; `None` until first stored
    persisted_version: Option<u64>,
    lifecycle: LifecycleState,
    audit: AuditStamp,
    prices: PriceTable,
    events: Vec<PriceListEvent>,
}

/// Stored state a price list is rebuilt from
#[derive(Debug, Clone)]
pub struct PriceListParts {
    pub id: PriceListId,
    pub reference: PriceListReference,
    pub strategy_boundary: StrategyKind,
    pub version: u64,
    pub lifecycle: LifecycleState,
    pub audit: AuditStamp,
    pub prices: PriceTable,
}

impl PriceList {
    /// Starts building a new price list
    pub fn builder() -> PriceListBuilder {
        PriceListBuilder::new()
    }

    /// Rebuilds a list from stored state, keeping its version
    ///
    /// # Errors
    ///
    /// Returns error if the stored prices break any aggregate invariant
    pub fn reconstitute(parts: PriceListParts) -> Result<Self, PricingError> {
        if parts.version == 0 {
            return Err(PricingError::validation("stored version must be at least 1"));
        }
        for (target, by_currency) in &parts.prices {
            if by_currency.is_empty() {
                return Err(PricingError::validation(format!(
                    "target {} has no prices",
                    target
                )));
            }
            for (currency, strategy) in by_currency {
                Self::check_entry(parts.strategy_boundary, *currency, strategy)?;
                strategy.validate()?;
            }
        }

        Ok(Self {
            id: parts.id,
            reference: parts.reference,
            strategy_boundary: parts.strategy_boundary,
            version: parts.version,
            persisted_version: Some(parts.version),
            lifecycle: parts.lifecycle,
            audit: parts.audit,
            prices: parts.prices,
            events: Vec::new(),
        })
    }

    pub fn id(&self) -> PriceListId {
        self.id
    }

    pub fn reference(&self) -> &PriceListReference {
        &self.reference
    }

    pub fn strategy_boundary(&self) -> StrategyKind {
        self.strategy_boundary
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Version the list had when it was loaded or last saved
    pub fn persisted_version(&self) -> Option<u64> {
        self.persisted_version
    }

    /// Called by repositories after a successful write
    pub fn mark_persisted(&mut self) {
        self.persisted_version = Some(self.version);
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    /// Number of stored (target, currency) prices
    pub fn price_count(&self) -> usize {
        self.prices.values().map(BTreeMap::len).sum()
    }

    /// Copy of the full price table; changes to it do not affect the list
    pub fn price_table(&self) -> PriceTable {
        self.prices.clone()
    }

    /// Stored strategy for a target and currency
    pub fn strategy(&self, target: ItemId, currency: Currency) -> Option<&PricingStrategy> {
        self.prices.get(&target)?.get(&currency)
    }

    /// Currencies a target is priced in
    pub fn available_currencies(&self, target: ItemId) -> BTreeSet<Currency> {
        self.prices
            .get(&target)
            .map(|by_currency| by_currency.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Price of `quantity` units of `target` in `currency`
    ///
    /// Returns `Ok(None)` if the list is soft-deleted or holds no such price.
    pub fn resolve(
        &self,
        target: ItemId,
        currency: Currency,
        quantity: Decimal,
    ) -> Result<Option<Money>, PricingError> {
        if self.lifecycle.is_soft_deleted() {
            return Ok(None);
        }
        match self.strategy(target, currency) {
            Some(strategy) => Ok(Some(strategy.calculate(quantity)?)),
            None => Ok(None),
        }
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<PriceListEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending events, oldest first
    pub fn pending_events(&self) -> &[PriceListEvent] {
        &self.events
    }

    pub fn activate(&mut self, at: DateTime<Utc>, actor: ActorId) -> Result<(), PricingError> {
        let next = self.lifecycle.activated()?;
        self.change_lifecycle(next, LifecycleChange::Activated, at, actor);
        Ok(())
    }

    pub fn deactivate(&mut self, at: DateTime<Utc>, actor: ActorId) -> Result<(), PricingError> {
        let next = self.lifecycle.deactivated()?;
        self.change_lifecycle(next, LifecycleChange::Deactivated, at, actor);
        Ok(())
    }

    pub fn archive(&mut self, at: DateTime<Utc>, actor: ActorId) -> Result<(), PricingError> {
        let next = self.lifecycle.archived()?;
        self.change_lifecycle(next, LifecycleChange::Archived, at, actor);
        Ok(())
    }

    pub fn unarchive(&mut self, at: DateTime<Utc>, actor: ActorId) -> Result<(), PricingError> {
        let next = self.lifecycle.unarchived()?;
        self.change_lifecycle(next, LifecycleChange::Unarchived, at, actor);
        Ok(())
    }

    pub fn soft_delete(&mut self, at: DateTime<Utc>, actor: ActorId) -> Result<(), PricingError> {
        let next = self.lifecycle.soft_deleted()?;
        self.change_lifecycle(next, LifecycleChange::SoftDeleted, at, actor);
        Ok(())
    }

    /// Brings back a soft-deleted list. Does nothing if the list is not
    /// soft-deleted.
    pub fn restore(&mut self, at: DateTime<Utc>, actor: ActorId) -> Result<(), PricingError> {
        if let Some(next) = self.lifecycle.restored() {
            self.change_lifecycle(next, LifecycleChange::Restored, at, actor);
        }
        Ok(())
    }

    /// Permanently ends the list and returns its last event
    pub fn hard_delete(self, at: DateTime<Utc>, actor: ActorId) -> PriceListEvent {
        PriceListEvent::PriceListHardDeleted {
            price_list_id: self.id,
            final_version: self.version,
            actor,
            timestamp: at,
        }
    }

    /// Stores `strategy` for `target` in `currency`, replacing any earlier one
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the list is soft-deleted
    /// - `NotActive` if the list is inactive
    /// - `StrategyMismatch` if the strategy kind is not the boundary
    /// - `CurrencyMismatch` if the strategy is denominated in another currency
    pub fn add_or_update_price(
        &mut self,
        target: ItemId,
        currency: Currency,
        strategy: PricingStrategy,
        at: DateTime<Utc>,
        actor: ActorId,
    ) -> Result<(), PricingError> {
        self.lifecycle.ensure_accepts_prices()?;
        Self::check_entry(self.strategy_boundary, currency, &strategy)?;

        let change = match self.strategy(target, currency) {
            Some(previous) => self.price_change_event(target, previous, &strategy, at, actor)?,
            None => None,
        };
        let strategy_type = strategy.kind();

        self.prices
            .entry(target)
            .or_default()
            .insert(currency, strategy);
        self.touch(at, actor);

        self.events.push(PriceListEvent::PriceSet {
            price_list_id: self.id,
            target_id: target,
            currency,
            strategy_type,
            actor,
            timestamp: at,
        });
        if let Some(event) = change {
            self.events.push(event);
        }
        Ok(())
    }

    /// Removes one price; the target disappears with its last currency
    pub fn remove_price(
        &mut self,
        target: ItemId,
        currency: Currency,
        at: DateTime<Utc>,
        actor: ActorId,
    ) -> Result<(), PricingError> {
        self.lifecycle.ensure_accepts_prices()?;

        let not_found = || PricingError::PriceNotFound {
            target: target.to_string(),
            currency: currency.to_string(),
        };
        let by_currency = self.prices.get_mut(&target).ok_or_else(not_found)?;
        by_currency.remove(&currency).ok_or_else(not_found)?;

        let target_purged = by_currency.is_empty();
        if target_purged {
            self.prices.remove(&target);
        }
        self.touch(at, actor);

        self.events.push(PriceListEvent::PriceRemoved {
            price_list_id: self.id,
            target_id: target,
            currency,
            target_purged,
            actor,
            timestamp: at,
        });
        Ok(())
    }

    /// Rescales every stored strategy by the adjustment's factor
    ///
    /// The new table is built completely before it replaces the old one, so a
    /// failure on any entry leaves the list untouched.
    pub fn apply_bulk_adjustment(
        &mut self,
        adjustment: &BulkAdjustment,
        at: DateTime<Utc>,
        actor: ActorId,
    ) -> Result<(), PricingError> {
        self.lifecycle.ensure_accepts_prices()?;
        let factor = adjustment.factor();

        let mut adjusted = PriceTable::new();
        for (target, by_currency) in &self.prices {
            let mut row = BTreeMap::new();
            for (currency, strategy) in by_currency {
                row.insert(*currency, strategy.adjusted_by(factor)?);
            }
            adjusted.insert(*target, row);
        }

        let entries_adjusted = self.price_count();
        self.prices = adjusted;
        self.touch(at, actor);

        debug!(
            price_list_id = %self.id,
            entries_adjusted,
            %factor,
            "Bulk adjustment applied"
        );

        self.events.push(PriceListEvent::BulkAdjustmentApplied {
            price_list_id: self.id,
            reason: adjustment.reason().to_string(),
            percentage: adjustment.percentage(),
            entries_adjusted,
            actor,
            timestamp: at,
        });
        Ok(())
    }

    /// Changes the strategy kind the list accepts
    ///
    /// Existing prices are never rewritten, so the list must be empty.
    pub fn shift_strategy(
        &mut self,
        new_boundary: StrategyKind,
        at: DateTime<Utc>,
        actor: ActorId,
    ) -> Result<(), PricingError> {
        if self.lifecycle.is_soft_deleted() {
            return Err(PricingError::transition(self.lifecycle.label(), "strategy_shift"));
        }
        if new_boundary == self.strategy_boundary {
            return Err(PricingError::validation(format!(
                "price list already uses {}",
                new_boundary
            )));
        }
        if !self.prices.is_empty() {
            return Err(PricingError::transition(
                format!("{} with {} prices", self.strategy_boundary, self.price_count()),
                new_boundary.to_string(),
            ));
        }

        let from = self.strategy_boundary;
        self.strategy_boundary = new_boundary;
        self.touch(at, actor);

        self.events.push(PriceListEvent::StrategyShifted {
            price_list_id: self.id,
            from,
            to: new_boundary,
            actor,
            timestamp: at,
        });
        Ok(())
    }

    /// Audit-only record of a rejected strategy; prices and version stay
    pub fn record_strategy_violation(
        &mut self,
        attempted: impl Into<String>,
        at: DateTime<Utc>,
        actor: ActorId,
    ) {
        self.events.push(PriceListEvent::StrategyViolationRecorded {
            price_list_id: self.id,
            boundary: self.strategy_boundary,
            attempted: attempted.into(),
            actor,
            timestamp: at,
        });
    }

    fn check_entry(
        boundary: StrategyKind,
        currency: Currency,
        strategy: &PricingStrategy,
    ) -> Result<(), PricingError> {
        if strategy.kind() != boundary {
            return Err(PricingError::StrategyMismatch {
                expected: boundary,
                actual: strategy.kind(),
            });
        }
        if strategy.currency() != currency {
            return Err(PricingError::CurrencyMismatch {
                expected: currency.to_string(),
                actual: strategy.currency().to_string(),
            });
        }
        Ok(())
    }

    fn price_change_event(
        &self,
        target: ItemId,
        previous: &PricingStrategy,
        current: &PricingStrategy,
        at: DateTime<Utc>,
        actor: ActorId,
    ) -> Result<Option<PriceListEvent>, PricingError> {
        let increased = current.is_more_expensive_than(previous)?;
        let decreased = previous.is_more_expensive_than(current)?;
        if !increased && !decreased {
            return Ok(None);
        }

        let previous = previous.reference_price()?;
        let current = current.reference_price()?;
        let event = if increased {
            PriceListEvent::PriceIncreased {
                price_list_id: self.id,
                target_id: target,
                previous,
                current,
                actor,
                timestamp: at,
            }
        } else {
            PriceListEvent::PriceDecreased {
                price_list_id: self.id,
                target_id: target,
                previous,
                current,
                actor,
                timestamp: at,
            }
        };
        Ok(Some(event))
    }

    fn change_lifecycle(
        &mut self,
        next: LifecycleState,
        change: LifecycleChange,
        at: DateTime<Utc>,
        actor: ActorId,
    ) {
        self.lifecycle = next;
        self.touch(at, actor);
        self.events.push(PriceListEvent::LifecycleChanged {
            price_list_id: self.id,
            change,
            actor,
            timestamp: at,
        });
    }

    fn touch(&mut self, at: DateTime<Utc>, actor: ActorId) {
        self.version += 1;
        self.audit = self.audit.touched(at, actor);
    }
}

/// Builder for creating new price lists
///
/// ```rust,ignore
/// let list = PriceList::builder()
///     .reference("EU-RETAIL")
///     .strategy_boundary(StrategyKind::Fixed)
///     .created_by(actor.id)
///     .created_at(clock.now())
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct PriceListBuilder {
    id: Option<PriceListId>,
    reference: Option<String>,
    strategy_boundary: Option<StrategyKind>,
    created_by: Option<ActorId>,
    created_at: Option<DateTime<Utc>>,
}

impl PriceListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-chosen id instead of a fresh one
    pub fn id(mut self, id: PriceListId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn strategy_boundary(mut self, kind: StrategyKind) -> Self {
        self.strategy_boundary = Some(kind);
        self
    }

    pub fn created_by(mut self, actor: ActorId) -> Self {
        self.created_by = Some(actor);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Builds an inactive, empty list at version 1
    ///
    /// # Errors
    ///
    /// Returns error if a required field is missing or the reference is invalid
    pub fn build(self) -> Result<PriceList, PricingError> {
        let reference = self
            .reference
            .ok_or_else(|| PricingError::MissingRequiredField("reference".to_string()))
            .and_then(PriceListReference::new)?;
        let strategy_boundary = self
            .strategy_boundary
            .ok_or_else(|| PricingError::MissingRequiredField("strategy_boundary".to_string()))?;
        let created_by = self
            .created_by
            .ok_or_else(|| PricingError::MissingRequiredField("created_by".to_string()))?;
        let created_at = self
            .created_at
            .ok_or_else(|| PricingError::MissingRequiredField("created_at".to_string()))?;

        let id = self.id.unwrap_or_else(PriceListId::new_v7);

        Ok(PriceList {
            id,
            reference: reference.clone(),
            strategy_boundary,
            version: 1,
            persisted_version: None,
            lifecycle: LifecycleState::new(),
            audit: AuditStamp::created(created_at, created_by),
            prices: PriceTable::new(),
            events: vec![PriceListEvent::PriceListCreated {
                price_list_id: id,
                reference: reference.to_string(),
                strategy_boundary,
                actor: created_by,
                timestamp: created_at,
            }],
        })
    }
}
