//! Authoring and retiring incompatibility rules

use std::sync::Arc;

use tracing::{info, instrument};

use core_kernel::{
    authorize, Actor, AuthorizationPolicy, Capability, Clock, ItemId, RuleId,
};
use domain_compatibility::{CompatibilityTag, IncompatibilityRule, RuleRecord, RuleStore};

use crate::error::ServiceError;

pub struct RuleAuthoringService {
    store: Arc<dyn RuleStore>,
    authorization: Arc<dyn AuthorizationPolicy>,
    clock: Arc<dyn Clock>,
}

impl RuleAuthoringService {
    pub fn new(
        store: Arc<dyn RuleStore>,
        authorization: Arc<dyn AuthorizationPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            authorization,
            clock,
        }
    }

    /// Stores a new active rule
    ///
    /// `trigger_tag` is normalized the way [`CompatibilityTag::new`] does.
    ///
    /// # Errors
    ///
    /// Validation error if both triggers are missing, the tag is malformed, or
    /// the rule would forbid its own trigger
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn add_rule(
        &self,
        actor: &Actor,
        trigger_id: Option<ItemId>,
        trigger_tag: Option<&str>,
        forbidden_id: ItemId,
    ) -> Result<RuleRecord, ServiceError> {
        authorize(self.authorization.as_ref(), actor, Capability::AuthorRules)?;
        let trigger_tag = trigger_tag.map(CompatibilityTag::new).transpose()?;
        let rule = IncompatibilityRule::new(trigger_id, trigger_tag, forbidden_id)?;

        let record = RuleRecord::new(rule, self.clock.now(), actor.id);
        self.store.add_rule(&record).await?;

        info!(rule_id = %record.id, rule = %record.rule, "incompatibility rule added");
        Ok(record)
    }

    /// Takes a rule out of force; it stays readable through [`Self::get_rule`]
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn retire_rule(&self, actor: &Actor, id: RuleId) -> Result<(), ServiceError> {
        authorize(self.authorization.as_ref(), actor, Capability::AuthorRules)?;
        self.store.deactivate_rule(id).await?;
        info!(rule_id = %id, "incompatibility rule retired");
        Ok(())
    }

    pub async fn get_rule(&self, actor: &Actor, id: RuleId) -> Result<RuleRecord, ServiceError> {
        authorize(self.authorization.as_ref(), actor, Capability::ReadCatalog)?;
        Ok(self.store.find_rule(id).await?)
    }

    /// Rules currently in force
    pub async fn active_rules(
        &self,
        actor: &Actor,
    ) -> Result<Vec<IncompatibilityRule>, ServiceError> {
        authorize(self.authorization.as_ref(), actor, Capability::ReadCatalog)?;
        Ok(self.store.find_active_rules().await?)
    }
}
