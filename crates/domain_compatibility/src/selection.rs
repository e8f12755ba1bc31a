//! What a customer has currently selected

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use core_kernel::ItemId;

use crate::tag::CompatibilityTag;

/// Anything a customer can pick that rules may react to
pub trait Selectable {
    fn id(&self) -> ItemId;
    fn tags(&self) -> &BTreeSet<CompatibilityTag>;
}

/// A selected product feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFeature {
    pub id: ItemId,
    #[serde(default)]
    pub tags: BTreeSet<CompatibilityTag>,
}

impl SelectedFeature {
    pub fn new(id: ItemId, tags: impl IntoIterator<Item = CompatibilityTag>) -> Self {
        Self {
            id,
            tags: tags.into_iter().collect(),
        }
    }

    pub fn untagged(id: ItemId) -> Self {
        Self {
            id,
            tags: BTreeSet::new(),
        }
    }
}

impl Selectable for SelectedFeature {
    fn id(&self) -> ItemId {
        self.id
    }

    fn tags(&self) -> &BTreeSet<CompatibilityTag> {
        &self.tags
    }
}

/// A selected product type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedType {
    pub id: ItemId,
    #[serde(default)]
    pub tags: BTreeSet<CompatibilityTag>,
}

impl SelectedType {
    pub fn new(id: ItemId, tags: impl IntoIterator<Item = CompatibilityTag>) -> Self {
        Self {
            id,
            tags: tags.into_iter().collect(),
        }
    }

    pub fn untagged(id: ItemId) -> Self {
        Self {
            id,
            tags: BTreeSet::new(),
        }
    }
}

impl Selectable for SelectedType {
    fn id(&self) -> ItemId {
        self.id
    }

    fn tags(&self) -> &BTreeSet<CompatibilityTag> {
        &self.tags
    }
}
