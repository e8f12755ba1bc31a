//! Price list commands and queries
//!
//! Every operation follows the same path: authorize the actor, take "now"
//! from the clock, load the list, apply the change, save it under the
//! version it was loaded at, then publish the drained events. A failed save
//! publishes nothing.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use core_kernel::{
    authorize, Actor, ActorId, AuthorizationPolicy, Capability, Clock, Currency, ItemId, Money,
    PortError, PriceListId,
};
use domain_pricing::{
    BulkAdjustment, PriceList, PriceListRepository, PriceTable, PricingError, PricingStrategy,
    StrategyKind, PRICE_LIST_ENTITY,
};

use crate::error::ServiceError;
use crate::events::EventPublisher;

pub struct PriceListService {
    repository: Arc<dyn PriceListRepository>,
    authorization: Arc<dyn AuthorizationPolicy>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventPublisher>,
    max_bulk_percentage: Decimal,
}

impl PriceListService {
    pub fn new(
        repository: Arc<dyn PriceListRepository>,
        authorization: Arc<dyn AuthorizationPolicy>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            authorization,
            clock,
            events,
            max_bulk_percentage: BulkAdjustment::MAX_PERCENTAGE,
        }
    }

    /// Caps bulk adjustments below the domain maximum
    pub fn with_max_bulk_percentage(mut self, limit: Decimal) -> Self {
        self.max_bulk_percentage = limit;
        self
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn get(&self, actor: &Actor, id: PriceListId) -> Result<PriceList, ServiceError> {
        self.authorize(actor, Capability::ReadCatalog)?;
        Ok(self.repository.find(id).await?)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn find_by_reference(
        &self,
        actor: &Actor,
        reference: &str,
    ) -> Result<Option<PriceList>, ServiceError> {
        self.authorize(actor, Capability::ReadCatalog)?;
        Ok(self.repository.find_by_reference(reference).await?)
    }

    /// Price of `quantity` units of `target`, or `None` when the list has no
    /// price for it or is soft-deleted
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn resolve_price(
        &self,
        actor: &Actor,
        id: PriceListId,
        target: ItemId,
        currency: Currency,
        quantity: Decimal,
    ) -> Result<Option<Money>, ServiceError> {
        self.authorize(actor, Capability::ReadCatalog)?;
        let list = self.repository.find(id).await?;
        Ok(list.resolve(target, currency, quantity)?)
    }

    pub async fn available_currencies(
        &self,
        actor: &Actor,
        id: PriceListId,
        target: ItemId,
    ) -> Result<BTreeSet<Currency>, ServiceError> {
        self.authorize(actor, Capability::ReadCatalog)?;
        Ok(self.repository.find(id).await?.available_currencies(target))
    }

    pub async fn price_table(
        &self,
        actor: &Actor,
        id: PriceListId,
    ) -> Result<PriceTable, ServiceError> {
        self.authorize(actor, Capability::ReadCatalog)?;
        Ok(self.repository.find(id).await?.price_table())
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Creates an inactive, empty list
    ///
    /// # Errors
    ///
    /// `PortError::AlreadyExists` (code `ALREADY_EXISTS`) when the reference
    /// is taken
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn create(
        &self,
        actor: &Actor,
        reference: &str,
        strategy_boundary: StrategyKind,
    ) -> Result<PriceList, ServiceError> {
        self.authorize(actor, Capability::ManagePrices)?;
        if self.repository.find_by_reference(reference).await?.is_some() {
            return Err(PortError::already_exists(PRICE_LIST_ENTITY, reference).into());
        }

        let mut list = PriceList::builder()
            .reference(reference)
            .strategy_boundary(strategy_boundary)
            .created_by(actor.id)
            .created_at(self.clock.now())
            .build()?;
        self.repository.save(&mut list).await?;
        self.publish(&mut list);

        info!(price_list_id = %list.id(), %strategy_boundary, "price list created");
        Ok(list)
    }

    pub async fn activate(&self, actor: &Actor, id: PriceListId) -> Result<PriceList, ServiceError> {
        self.mutate(actor, Capability::ManagePrices, id, |list, at, by| {
            list.activate(at, by)
        })
        .await
    }

    pub async fn deactivate(
        &self,
        actor: &Actor,
        id: PriceListId,
    ) -> Result<PriceList, ServiceError> {
        self.mutate(actor, Capability::ManagePrices, id, |list, at, by| {
            list.deactivate(at, by)
        })
        .await
    }

    pub async fn archive(&self, actor: &Actor, id: PriceListId) -> Result<PriceList, ServiceError> {
        self.mutate(actor, Capability::ArchivePriceLists, id, |list, at, by| {
            list.archive(at, by)
        })
        .await
    }

    pub async fn unarchive(
        &self,
        actor: &Actor,
        id: PriceListId,
    ) -> Result<PriceList, ServiceError> {
        self.mutate(actor, Capability::ArchivePriceLists, id, |list, at, by| {
            list.unarchive(at, by)
        })
        .await
    }

    pub async fn soft_delete(
        &self,
        actor: &Actor,
        id: PriceListId,
    ) -> Result<PriceList, ServiceError> {
        self.mutate(actor, Capability::SoftDeletePriceLists, id, |list, at, by| {
            list.soft_delete(at, by)
        })
        .await
    }

    /// Undoes a soft delete; a list that is not deleted is returned as is
    pub async fn restore(&self, actor: &Actor, id: PriceListId) -> Result<PriceList, ServiceError> {
        self.authorize(actor, Capability::SoftDeletePriceLists)?;
        let mut list = self.repository.find(id).await?;
        if !list.lifecycle().is_soft_deleted() {
            return Ok(list);
        }
        list.restore(self.clock.now(), actor.id)?;
        self.repository.save(&mut list).await?;
        self.publish(&mut list);
        Ok(list)
    }

    /// Permanently removes the list if nobody changed it since it was read
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn hard_delete(&self, actor: &Actor, id: PriceListId) -> Result<(), ServiceError> {
        self.authorize(actor, Capability::HardDeletePriceLists)?;
        let list = self.repository.find(id).await?;
        let version = list.version();

        self.repository.delete(id, version).await?;
        let event = list.hard_delete(self.clock.now(), actor.id);
        self.events.publish(&event);

        warn!(price_list_id = %id, final_version = version, "price list hard-deleted");
        Ok(())
    }

    /// Stores or replaces the price of `target` in `currency`
    ///
    /// A strategy outside the list's boundary is rejected with
    /// `STRATEGY_MISMATCH` and the attempt is published as an audit event.
    #[instrument(skip(self, actor, strategy), fields(actor = %actor.id, kind = %strategy.kind()))]
    pub async fn set_price(
        &self,
        actor: &Actor,
        id: PriceListId,
        target: ItemId,
        currency: Currency,
        strategy: PricingStrategy,
    ) -> Result<PriceList, ServiceError> {
        self.authorize(actor, Capability::ManagePrices)?;
        let mut list = self.repository.find(id).await?;
        let at = self.clock.now();
        let attempted = strategy.kind();

        if let Err(error) = list.add_or_update_price(target, currency, strategy, at, actor.id) {
            if matches!(error, PricingError::StrategyMismatch { .. }) {
                warn!(
                    price_list_id = %id,
                    boundary = %list.strategy_boundary(),
                    %attempted,
                    "strategy outside boundary rejected"
                );
                list.record_strategy_violation(attempted.as_str(), at, actor.id);
                self.publish(&mut list);
            }
            return Err(error.into());
        }

        self.repository.save(&mut list).await?;
        self.publish(&mut list);
        Ok(list)
    }

    pub async fn remove_price(
        &self,
        actor: &Actor,
        id: PriceListId,
        target: ItemId,
        currency: Currency,
    ) -> Result<PriceList, ServiceError> {
        self.mutate(actor, Capability::ManagePrices, id, move |list, at, by| {
            list.remove_price(target, currency, at, by)
        })
        .await
    }

    /// Rescales every price in the list by `percentage`
    ///
    /// # Errors
    ///
    /// Validation error if the percentage is outside the domain range or above
    /// the configured limit
    #[instrument(skip(self, actor, reason), fields(actor = %actor.id))]
    pub async fn apply_bulk_adjustment(
        &self,
        actor: &Actor,
        id: PriceListId,
        reason: &str,
        percentage: Decimal,
    ) -> Result<PriceList, ServiceError> {
        self.authorize(actor, Capability::ManagePrices)?;
        let adjustment = BulkAdjustment::new(reason, percentage)?;
        if adjustment.percentage() > self.max_bulk_percentage {
            return Err(ServiceError::Validation(format!(
                "bulk adjustment of {}% exceeds the configured limit of {}%",
                adjustment.percentage(),
                self.max_bulk_percentage
            )));
        }

        self.mutate(actor, Capability::ManagePrices, id, |list, at, by| {
            list.apply_bulk_adjustment(&adjustment, at, by)
        })
        .await
    }

    pub async fn shift_strategy(
        &self,
        actor: &Actor,
        id: PriceListId,
        new_boundary: StrategyKind,
    ) -> Result<PriceList, ServiceError> {
        self.mutate(actor, Capability::ShiftStrategy, id, move |list, at, by| {
            list.shift_strategy(new_boundary, at, by)
        })
        .await
    }

    // ------------------------------------------------------------------

    fn authorize(&self, actor: &Actor, capability: Capability) -> Result<(), ServiceError> {
        authorize(self.authorization.as_ref(), actor, capability).map_err(|e| {
            warn!(actor = %actor.id, %capability, "authorization refused");
            ServiceError::from(e)
        })
    }

    /// Load, change, save, publish
    async fn mutate<F>(
        &self,
        actor: &Actor,
        capability: Capability,
        id: PriceListId,
        change: F,
    ) -> Result<PriceList, ServiceError>
    where
        F: FnOnce(&mut PriceList, DateTime<Utc>, ActorId) -> Result<(), PricingError> + Send,
    {
        self.authorize(actor, capability)?;
        let mut list = self.repository.find(id).await?;
        change(&mut list, self.clock.now(), actor.id)?;
        self.repository.save(&mut list).await?;
        self.publish(&mut list);
        Ok(list)
    }

    fn publish(&self, list: &mut PriceList) {
        for event in list.take_events() {
            self.events.publish(&event);
        }
    }
}
