//! Core Kernel - Foundational types for the catalog configuration engine
//!
//! This crate provides the building blocks shared by the pricing and
//! compatibility domains:
//! - Money with precise, explicitly scaled decimal arithmetic
//! - Strongly typed identifiers
//! - Audit time source and audit stamps
//! - Capability-based authorization
//! - Port error types for persistence collaborators

pub mod money;
pub mod identifiers;
pub mod audit;
pub mod authorization;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{PriceListId, ItemId, RuleId, ActorId};
pub use audit::{Clock, SystemClock, MonotonicClock, FixedClock, AuditStamp};
pub use authorization::{
    authorize, Actor, AuthorizationError, AuthorizationPolicy, Capability, Role, RoleBasedPolicy,
    CAPABILITY_MISSING,
};
pub use ports::{PortError, DomainPort};
