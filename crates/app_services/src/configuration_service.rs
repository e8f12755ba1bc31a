//! Selection validation against the live rule set
//!
//! Rules are read from the store on every call and folded into a fresh
//! [`CompatibilityPolicy`], so authoring changes apply to the next query.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use core_kernel::{authorize, Actor, AuthorizationPolicy, Capability, ItemId};
use domain_compatibility::{
    CompatibilityPolicy, RuleStore, SelectedFeature, SelectedType, SelectionValidator,
    ValidationResult,
};

use crate::error::ServiceError;

pub struct ConfigurationService {
    rules: Arc<dyn RuleStore>,
    authorization: Arc<dyn AuthorizationPolicy>,
    validator: SelectionValidator,
}

impl ConfigurationService {
    pub fn new(rules: Arc<dyn RuleStore>, authorization: Arc<dyn AuthorizationPolicy>) -> Self {
        Self {
            rules,
            authorization,
            validator: SelectionValidator::new(),
        }
    }

    async fn current_policy(&self) -> Result<CompatibilityPolicy, ServiceError> {
        let rules = self.rules.find_active_rules().await?;
        let policy = CompatibilityPolicy::from_rules(&rules);
        debug!(rules = policy.len(), "compatibility policy built");
        Ok(policy)
    }

    /// Checks that no selected feature is forbidden by the rest of the
    /// selection
    #[instrument(
        skip(self, actor, features, types),
        fields(actor = %actor.id, features = features.len(), types = types.len())
    )]
    pub async fn validate_selection(
        &self,
        actor: &Actor,
        features: &[SelectedFeature],
        types: &[SelectedType],
    ) -> Result<ValidationResult, ServiceError> {
        authorize(self.authorization.as_ref(), actor, Capability::ReadCatalog)?;
        let policy = self.current_policy().await?;
        Ok(self.validator.validate_with_policy(&policy, features, types))
    }

    /// Every item the selection rules out, selected or not
    pub async fn forbidden_items(
        &self,
        actor: &Actor,
        features: &[SelectedFeature],
        types: &[SelectedType],
    ) -> Result<HashSet<ItemId>, ServiceError> {
        authorize(self.authorization.as_ref(), actor, Capability::ReadCatalog)?;
        let policy = self.current_policy().await?;
        Ok(policy.incompatible_with(features, types))
    }
}
