//! Indexed compatibility policy
//!
//! [`CompatibilityPolicy`] folds a rule set into two indexes, trigger id to
//! forbidden ids and trigger tag to forbidden ids. A query then touches only
//! the selection's own ids and tags, never the full rule list. The policy is
//! immutable once built and can be shared across threads behind an `Arc`.

use std::collections::{HashMap, HashSet};

use core_kernel::ItemId;

use crate::rule::IncompatibilityRule;
use crate::selection::Selectable;
use crate::tag::CompatibilityTag;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityPolicy {
    by_id: HashMap<ItemId, HashSet<ItemId>>,
    by_tag: HashMap<CompatibilityTag, HashSet<ItemId>>,
    rule_count: usize,
}

impl CompatibilityPolicy {
    /// Builds both indexes in one pass over `rules`. A rule with both
    /// triggers lands in both indexes.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a IncompatibilityRule>) -> Self {
        rules.into_iter().fold(Self::default(), |mut policy, rule| {
            if let Some(id) = rule.trigger_id() {
                policy
                    .by_id
                    .entry(id)
                    .or_default()
                    .insert(rule.forbidden_id());
            }
            if let Some(tag) = rule.trigger_tag() {
                policy
                    .by_tag
                    .entry(tag.clone())
                    .or_default()
                    .insert(rule.forbidden_id());
            }
            policy.rule_count += 1;
            policy
        })
    }

    /// Every id forbidden by the combined selection of features and types
    pub fn incompatible_with<F, T>(&self, features: &[F], types: &[T]) -> HashSet<ItemId>
    where
        F: Selectable,
        T: Selectable,
    {
        let mut ids = HashSet::new();
        let mut tags = HashSet::new();
        for item in features
            .iter()
            .map(|f| f as &dyn Selectable)
            .chain(types.iter().map(|t| t as &dyn Selectable))
        {
            ids.insert(item.id());
            tags.extend(item.tags().iter());
        }

        let mut forbidden = HashSet::new();
        for id in &ids {
            if let Some(hits) = self.by_id.get(id) {
                forbidden.extend(hits.iter().copied());
            }
        }
        for tag in tags {
            if let Some(hits) = self.by_tag.get(tag) {
                forbidden.extend(hits.iter().copied());
            }
        }
        forbidden
    }

    /// Ids forbidden by selecting `id`
    pub fn forbidden_by_item(&self, id: ItemId) -> HashSet<ItemId> {
        self.by_id.get(&id).cloned().unwrap_or_default()
    }

    /// Ids forbidden by selecting anything tagged `tag`
    pub fn forbidden_by_tag(&self, tag: &CompatibilityTag) -> HashSet<ItemId> {
        self.by_tag.get(tag).cloned().unwrap_or_default()
    }

    /// Number of rules folded into the policy
    pub fn len(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }
}
