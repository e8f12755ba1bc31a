//! Pricing Domain
//!
//! Multi-currency pricing strategies and the versioned PriceList aggregate.
//!
//! # Architecture
//!
//! - **Value Objects**: PricingStrategy variants, TierSchedule, BulkAdjustment
//! - **Aggregates**: PriceList, locked to one strategy kind
//! - **Domain Events**: PriceSet, PriceIncreased, StrategyShifted, ...
//! - **Ports**: PriceListRepository
//!
//! # Price List Lifecycle
//!
//! ```text
//! inactive <-> active
//!     \          \
//!      -> archived -> (unarchive) -> inactive
//! any live state -> soft_deleted -> (restore) -> previous state
//! any state -> hard_deleted (terminal)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_pricing::{PriceList, PricingStrategy, StrategyKind};
//!
//! let mut list = PriceList::builder()
//!     .reference("EU-RETAIL")
//!     .strategy_boundary(StrategyKind::Fixed)
//!     .created_by(actor.id)
//!     .created_at(clock.now())
//!     .build()?;
//!
//! list.activate(clock.now(), actor.id)?;
//! list.add_or_update_price(item, Currency::EUR, PricingStrategy::fixed(price), clock.now(), actor.id)?;
//! ```

pub mod tier;
pub mod strategy;
pub mod adjustment;
pub mod lifecycle;
pub mod events;
pub mod price_list;
pub mod record;
pub mod ports;
pub mod error;

pub use tier::{QuantityKind, TierBucket, TierSchedule};
pub use strategy::{
    FixedPrice, NonePrice, PriceCalculator, PricingStrategy, ScaledPrice, StrategyKind,
    TieredGraduatedPrice, TieredVolumePrice, REFERENCE_QUANTITY,
};
pub use adjustment::BulkAdjustment;
pub use lifecycle::LifecycleState;
pub use events::{LifecycleChange, PriceListEvent};
pub use price_list::{PriceList, PriceListBuilder, PriceListParts, PriceListReference, PriceTable};
pub use record::{encode_strategy, PriceEntryRecord, PriceListSnapshot};
pub use ports::{PriceListRepository, PRICE_LIST_ENTITY};
pub use error::PricingError;
