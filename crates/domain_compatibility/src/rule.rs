//! Incompatibility rules
//!
//! A rule says: once the selection contains `trigger_id`, or anything tagged
//! `trigger_tag`, the feature `forbidden_id` may no longer be selected.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use core_kernel::ItemId;

use crate::error::CompatibilityError;
use crate::tag::CompatibilityTag;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub struct IncompatibilityRule {
    trigger_id: Option<ItemId>,
    trigger_tag: Option<CompatibilityTag>,
    forbidden_id: ItemId,
}

impl IncompatibilityRule {
    /// # Errors
    ///
    /// - `MissingTrigger` if both triggers are absent
    /// - `SelfReferential` if `trigger_id` equals `forbidden_id`
    pub fn new(
        trigger_id: Option<ItemId>,
        trigger_tag: Option<CompatibilityTag>,
        forbidden_id: ItemId,
    ) -> Result<Self, CompatibilityError> {
        if trigger_id.is_none() && trigger_tag.is_none() {
            return Err(CompatibilityError::MissingTrigger { forbidden_id });
        }
        if trigger_id == Some(forbidden_id) {
            return Err(CompatibilityError::SelfReferential(forbidden_id));
        }
        Ok(Self {
            trigger_id,
            trigger_tag,
            forbidden_id,
        })
    }

    /// Selecting `trigger` forbids `forbidden`
    pub fn by_id(trigger: ItemId, forbidden: ItemId) -> Result<Self, CompatibilityError> {
        Self::new(Some(trigger), None, forbidden)
    }

    /// Selecting anything tagged `tag` forbids `forbidden`
    pub fn by_tag(tag: CompatibilityTag, forbidden: ItemId) -> Result<Self, CompatibilityError> {
        Self::new(None, Some(tag), forbidden)
    }

    pub fn trigger_id(&self) -> Option<ItemId> {
        self.trigger_id
    }

    pub fn trigger_tag(&self) -> Option<&CompatibilityTag> {
        self.trigger_tag.as_ref()
    }

    pub fn forbidden_id(&self) -> ItemId {
        self.forbidden_id
    }

    /// True if either trigger is present in the selection
    pub fn is_triggered_by(
        &self,
        selected_ids: &HashSet<ItemId>,
        selected_tags: &HashSet<CompatibilityTag>,
    ) -> bool {
        self.trigger_id.is_some_and(|id| selected_ids.contains(&id))
            || self
                .trigger_tag
                .as_ref()
                .is_some_and(|tag| selected_tags.contains(tag))
    }
}

impl fmt::Display for IncompatibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.trigger_id, &self.trigger_tag) {
            (Some(id), Some(tag)) => write!(f, "{} or #{} forbids {}", id, tag, self.forbidden_id),
            (Some(id), None) => write!(f, "{} forbids {}", id, self.forbidden_id),
            (None, Some(tag)) => write!(f, "#{} forbids {}", tag, self.forbidden_id),
            (None, None) => write!(f, "untriggered rule for {}", self.forbidden_id),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawRule {
    #[serde(default)]
    trigger_id: Option<ItemId>,
    #[serde(default)]
    trigger_tag: Option<CompatibilityTag>,
    forbidden_id: ItemId,
}

impl TryFrom<RawRule> for IncompatibilityRule {
    type Error = CompatibilityError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        IncompatibilityRule::new(raw.trigger_id, raw.trigger_tag, raw.forbidden_id)
    }
}

impl From<IncompatibilityRule> for RawRule {
    fn from(rule: IncompatibilityRule) -> Self {
        RawRule {
            trigger_id: rule.trigger_id,
            trigger_tag: rule.trigger_tag,
            forbidden_id: rule.forbidden_id,
        }
    }
}
