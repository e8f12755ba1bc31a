//! Pricing Domain Ports
//!
//! Persistence contract for price lists. Adapters live in `infra_db`
//! (PostgreSQL and in-memory) and share the same optimistic versioning rules:
//!
//! - a list with no persisted version is inserted, and the insert fails with
//!   `PortError::VersionConflict` if the id already exists, or
//!   `PortError::AlreadyExists` if another list holds the same reference
//! - otherwise the write succeeds only while the stored version still equals
//!   the version the list was loaded at
//! - after a successful write the adapter calls `PriceList::mark_persisted`
//!
//! ```rust,ignore
//! let mut list = repository.find(id).await?;
//! list.activate(clock.now(), actor.id)?;
//! repository.save(&mut list).await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError, PriceListId};

use crate::price_list::PriceList;

/// Entity name used in port errors
pub const PRICE_LIST_ENTITY: &str = "PriceList";

#[async_trait]
pub trait PriceListRepository: DomainPort {
    /// Loads a list, or `PortError::NotFound`
    async fn find(&self, id: PriceListId) -> Result<PriceList, PortError>;

    /// Loads a list by its business reference
    async fn find_by_reference(&self, reference: &str) -> Result<Option<PriceList>, PortError>;

    /// Inserts or updates `list` under optimistic versioning
    async fn save(&self, list: &mut PriceList) -> Result<(), PortError>;

    /// Permanently removes a list if it is still at `expected_version`
    async fn delete(&self, id: PriceListId, expected_version: u64) -> Result<(), PortError>;
}
