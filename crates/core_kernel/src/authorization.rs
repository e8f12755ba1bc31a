//! Capability-based authorization
//!
//! All role comparisons live behind one [`AuthorizationPolicy`]. Services call
//! [`authorize`] before every state-mutating operation; aggregates stay free
//! of authorization concerns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::identifiers::ActorId;

/// Stable code attached to every authorization failure
pub const CAPABILITY_MISSING: &str = "AUTHZ_CAPABILITY_MISSING";

/// Something an actor may be allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read price lists and evaluate selections
    ReadCatalog,
    /// Create price lists, set, remove and bulk-adjust prices, toggle activation
    ManagePrices,
    /// Change the strategy boundary of a price list
    ShiftStrategy,
    /// Archive and unarchive
    ArchivePriceLists,
    /// Soft-delete and restore
    SoftDeletePriceLists,
    /// Permanently delete
    HardDeletePriceLists,
    /// Create and retire incompatibility rules
    AuthorRules,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ReadCatalog => "catalog:read",
            Capability::ManagePrices => "prices:manage",
            Capability::ShiftStrategy => "prices:shift_strategy",
            Capability::ArchivePriceLists => "prices:archive",
            Capability::SoftDeletePriceLists => "prices:soft_delete",
            Capability::HardDeletePriceLists => "prices:hard_delete",
            Capability::AuthorRules => "rules:author",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse roles an actor may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    PriceEditor,
    CatalogManager,
    Admin,
}

/// The caller of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub roles: BTreeSet<Role>,
}

impl Actor {
    pub fn new(name: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Authorization failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: actor {actor} lacks capability '{capability}'")]
pub struct AuthorizationError {
    pub code: &'static str,
    pub actor: ActorId,
    pub capability: Capability,
}

/// Decides whether an actor holds a capability
pub trait AuthorizationPolicy: Send + Sync {
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool;
}

/// Checks `capability` and turns a refusal into an [`AuthorizationError`]
pub fn authorize(
    policy: &dyn AuthorizationPolicy,
    actor: &Actor,
    capability: Capability,
) -> Result<(), AuthorizationError> {
    if policy.has_capability(actor, capability) {
        Ok(())
    } else {
        Err(AuthorizationError {
            code: CAPABILITY_MISSING,
            actor: actor.id,
            capability,
        })
    }
}

/// Default role ladder: each role includes the capabilities of the roles below
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleBasedPolicy;

impl RoleBasedPolicy {
    /// Capabilities granted by a single role
    pub fn capabilities_of(role: Role) -> &'static [Capability] {
        use Capability::*;
        match role {
            Role::Viewer => &[ReadCatalog],
            Role::PriceEditor => &[ReadCatalog, ManagePrices],
            Role::CatalogManager => &[
                ReadCatalog,
                ManagePrices,
                ShiftStrategy,
                ArchivePriceLists,
                SoftDeletePriceLists,
                AuthorRules,
            ],
            Role::Admin => &[
                ReadCatalog,
                ManagePrices,
                ShiftStrategy,
                ArchivePriceLists,
                SoftDeletePriceLists,
                HardDeletePriceLists,
                AuthorRules,
            ],
        }
    }
}

impl AuthorizationPolicy for RoleBasedPolicy {
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool {
        actor
            .roles
            .iter()
            .any(|role| Self::capabilities_of(*role).contains(&capability))
    }
}
