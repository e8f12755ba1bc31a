//! Test Data Builders
//!
//! Builders that produce domain aggregates with sensible defaults, so a test
//! only names the fields it cares about.

use chrono::{DateTime, Utc};
use core_kernel::{ActorId, Currency, ItemId};
use domain_compatibility::{CompatibilityTag, IncompatibilityRule, RuleRecord};
use domain_pricing::{PriceList, PricingStrategy, StrategyKind};

use crate::fixtures::TemporalFixtures;

/// Builder for price lists, optionally active and pre-filled with prices
pub struct TestPriceListBuilder {
    reference: String,
    boundary: StrategyKind,
    actor: ActorId,
    at: DateTime<Utc>,
    active: bool,
    prices: Vec<(ItemId, Currency, PricingStrategy)>,
}

impl Default for TestPriceListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPriceListBuilder {
    /// An inactive `fixed` list with no prices
    pub fn new() -> Self {
        Self {
            reference: "TEST-LIST".to_string(),
            boundary: StrategyKind::Fixed,
            actor: ActorId::new(),
            at: TemporalFixtures::epoch(),
            active: false,
            prices: Vec::new(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_boundary(mut self, boundary: StrategyKind) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }

    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Adds a price; implies [`TestPriceListBuilder::active`]
    pub fn with_price(mut self, target: ItemId, strategy: PricingStrategy) -> Self {
        self.active = true;
        self.prices.push((target, strategy.currency(), strategy));
        self
    }

    /// Builds the list and drains its creation events
    ///
    /// # Panics
    ///
    /// Panics if a price breaks the list's strategy boundary
    pub fn build(self) -> PriceList {
        let mut list = PriceList::builder()
            .reference(self.reference)
            .strategy_boundary(self.boundary)
            .created_by(self.actor)
            .created_at(self.at)
            .build()
            .expect("valid test price list");

        if self.active {
            list.activate(self.at, self.actor).expect("activate test list");
        }
        for (target, currency, strategy) in self.prices {
            list.add_or_update_price(target, currency, strategy, self.at, self.actor)
                .expect("price within the test list's boundary");
        }
        list.take_events();
        list
    }
}

/// Builder for stored rule records
pub struct TestRuleBuilder {
    trigger_id: Option<ItemId>,
    trigger_tag: Option<CompatibilityTag>,
    forbidden_id: ItemId,
    active: bool,
}

impl TestRuleBuilder {
    /// A rule forbidding `forbidden_id`; give it a trigger before building
    pub fn forbidding(forbidden_id: ItemId) -> Self {
        Self {
            trigger_id: None,
            trigger_tag: None,
            forbidden_id,
            active: true,
        }
    }

    pub fn triggered_by(mut self, id: ItemId) -> Self {
        self.trigger_id = Some(id);
        self
    }

    /// # Panics
    ///
    /// Panics if `tag` is not a valid compatibility tag
    pub fn triggered_by_tag(mut self, tag: &str) -> Self {
        self.trigger_tag = Some(CompatibilityTag::new(tag).expect("valid test tag"));
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// # Panics
    ///
    /// Panics if the rule has no trigger or forbids its own trigger
    pub fn build(self) -> RuleRecord {
        let rule = IncompatibilityRule::new(self.trigger_id, self.trigger_tag, self.forbidden_id)
            .expect("valid test rule");
        let mut record = RuleRecord::new(rule, TemporalFixtures::epoch(), ActorId::new());
        record.active = self.active;
        record
    }
}
