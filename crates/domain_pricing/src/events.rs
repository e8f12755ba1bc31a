//! Domain events for the price list aggregate
//!
//! Events are collected on the aggregate while it is mutated and drained by
//! the application layer with `take_events` after a successful save.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ActorId, Currency, ItemId, Money, PriceListId};

use crate::strategy::StrategyKind;

/// Lifecycle flags a list moved between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleChange {
    Activated,
    Deactivated,
    Archived,
    Unarchived,
    SoftDeleted,
    Restored,
}

/// Domain events emitted by the PriceList aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PriceListEvent {
    /// A new list was created
    PriceListCreated {
        price_list_id: PriceListId,
        reference: String,
        strategy_boundary: StrategyKind,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },

    /// Activation, archival or soft deletion changed
    LifecycleChanged {
        price_list_id: PriceListId,
        change: LifecycleChange,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },

    /// A strategy was stored for a target and currency
    PriceSet {
        price_list_id: PriceListId,
        target_id: ItemId,
        currency: Currency,
        strategy_type: StrategyKind,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },

    /// The replaced strategy was cheaper at the reference quantity
    PriceIncreased {
        price_list_id: PriceListId,
        target_id: ItemId,
        previous: Money,
        current: Money,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },

    /// The replaced strategy was more expensive at the reference quantity
    PriceDecreased {
        price_list_id: PriceListId,
        target_id: ItemId,
        previous: Money,
        current: Money,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },

    /// A price was removed
    PriceRemoved {
        price_list_id: PriceListId,
        target_id: ItemId,
        currency: Currency,
        target_purged: bool,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },

    /// Every price was rescaled by a percentage
    BulkAdjustmentApplied {
        price_list_id: PriceListId,
        reason: String,
        percentage: Decimal,
        entries_adjusted: usize,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },

    /// The accepted strategy variant changed
    StrategyShifted {
        price_list_id: PriceListId,
        from: StrategyKind,
        to: StrategyKind,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },

    /// Someone tried to store a strategy outside the boundary
    StrategyViolationRecorded {
        price_list_id: PriceListId,
        boundary: StrategyKind,
        attempted: String,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },

    /// The list was permanently removed
    PriceListHardDeleted {
        price_list_id: PriceListId,
        final_version: u64,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },
}

impl PriceListEvent {
    /// Returns the price list ID associated with this event
    pub fn price_list_id(&self) -> PriceListId {
        match self {
            PriceListEvent::PriceListCreated { price_list_id, .. } => *price_list_id,
            PriceListEvent::LifecycleChanged { price_list_id, .. } => *price_list_id,
            PriceListEvent::PriceSet { price_list_id, .. } => *price_list_id,
            PriceListEvent::PriceIncreased { price_list_id, .. } => *price_list_id,
            PriceListEvent::PriceDecreased { price_list_id, .. } => *price_list_id,
            PriceListEvent::PriceRemoved { price_list_id, .. } => *price_list_id,
            PriceListEvent::BulkAdjustmentApplied { price_list_id, .. } => *price_list_id,
            PriceListEvent::StrategyShifted { price_list_id, .. } => *price_list_id,
            PriceListEvent::StrategyViolationRecorded { price_list_id, .. } => *price_list_id,
            PriceListEvent::PriceListHardDeleted { price_list_id, .. } => *price_list_id,
        }
    }

    /// Returns the actor that caused this event
    pub fn actor(&self) -> ActorId {
        match self {
            PriceListEvent::PriceListCreated { actor, .. } => *actor,
            PriceListEvent::LifecycleChanged { actor, .. } => *actor,
            PriceListEvent::PriceSet { actor, .. } => *actor,
            PriceListEvent::PriceIncreased { actor, .. } => *actor,
            PriceListEvent::PriceDecreased { actor, .. } => *actor,
            PriceListEvent::PriceRemoved { actor, .. } => *actor,
            PriceListEvent::BulkAdjustmentApplied { actor, .. } => *actor,
            PriceListEvent::StrategyShifted { actor, .. } => *actor,
            PriceListEvent::StrategyViolationRecorded { actor, .. } => *actor,
            PriceListEvent::PriceListHardDeleted { actor, .. } => *actor,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PriceListEvent::PriceListCreated { timestamp, .. } => *timestamp,
            PriceListEvent::LifecycleChanged { timestamp, .. } => *timestamp,
            PriceListEvent::PriceSet { timestamp, .. } => *timestamp,
            PriceListEvent::PriceIncreased { timestamp, .. } => *timestamp,
            PriceListEvent::PriceDecreased { timestamp, .. } => *timestamp,
            PriceListEvent::PriceRemoved { timestamp, .. } => *timestamp,
            PriceListEvent::BulkAdjustmentApplied { timestamp, .. } => *timestamp,
            PriceListEvent::StrategyShifted { timestamp, .. } => *timestamp,
            PriceListEvent::StrategyViolationRecorded { timestamp, .. } => *timestamp,
            PriceListEvent::PriceListHardDeleted { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            PriceListEvent::PriceListCreated { .. } => "PriceListCreated",
            PriceListEvent::LifecycleChanged { .. } => "LifecycleChanged",
            PriceListEvent::PriceSet { .. } => "PriceSet",
            PriceListEvent::PriceIncreased { .. } => "PriceIncreased",
            PriceListEvent::PriceDecreased { .. } => "PriceDecreased",
            PriceListEvent::PriceRemoved { .. } => "PriceRemoved",
            PriceListEvent::BulkAdjustmentApplied { .. } => "BulkAdjustmentApplied",
            PriceListEvent::StrategyShifted { .. } => "StrategyShifted",
            PriceListEvent::StrategyViolationRecorded { .. } => "StrategyViolationRecorded",
            PriceListEvent::PriceListHardDeleted { .. } => "PriceListHardDeleted",
        }
    }
}
