//! Compatibility Domain Ports
//!
//! The rule store is read fresh on every selection validation, so a rule
//! authored or retired takes effect on the next query without any cache to
//! invalidate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ActorId, DomainPort, PortError, RuleId};

use crate::rule::IncompatibilityRule;

/// Entity name used in port errors
pub const RULE_ENTITY: &str = "IncompatibilityRule";

/// A stored rule with its bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: RuleId,
    pub rule: IncompatibilityRule,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: ActorId,
}

impl RuleRecord {
    /// A new, active record
    pub fn new(rule: IncompatibilityRule, created_at: DateTime<Utc>, created_by: ActorId) -> Self {
        Self {
            id: RuleId::new_v7(),
            rule,
            active: true,
            created_at,
            created_by,
        }
    }
}

#[async_trait]
pub trait RuleStore: DomainPort {
    /// Rules currently in force
    async fn find_active_rules(&self) -> Result<Vec<IncompatibilityRule>, PortError>;

    /// Loads one record, active or not
    async fn find_rule(&self, id: RuleId) -> Result<RuleRecord, PortError>;

    /// Stores a new record; `PortError::AlreadyExists` if the id is taken
    async fn add_rule(&self, record: &RuleRecord) -> Result<(), PortError>;

    /// Marks a rule inactive; `PortError::NotFound` if it does not exist
    async fn deactivate_rule(&self, id: RuleId) -> Result<(), PortError>;
}
