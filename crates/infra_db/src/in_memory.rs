//! In-memory adapters
//!
//! Same contract as the PostgreSQL adapters, including version checks and
//! unique references, backed by maps behind a `tokio::sync::RwLock`. Lists
//! are held as [`PriceListSnapshot`]s so every load decodes a fresh
//! aggregate, exactly as a database round trip would.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{DomainPort, PortError, PriceListId, RuleId};
use domain_compatibility::{IncompatibilityRule, RuleRecord, RuleStore, RULE_ENTITY};
use domain_pricing::{PriceList, PriceListRepository, PriceListSnapshot, PRICE_LIST_ENTITY};

/// Price lists kept in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceListRepository {
    lists: Arc<RwLock<HashMap<PriceListId, PriceListSnapshot>>>,
}

impl InMemoryPriceListRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored lists
    pub async fn len(&self) -> usize {
        self.lists.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lists.read().await.is_empty()
    }
}

fn restore(snapshot: PriceListSnapshot) -> Result<PriceList, PortError> {
    let id = snapshot.id;
    snapshot
        .restore()
        .map_err(|e| PortError::corrupt(PRICE_LIST_ENTITY, id, e.to_string()))
}

impl DomainPort for InMemoryPriceListRepository {}

#[async_trait]
impl PriceListRepository for InMemoryPriceListRepository {
    async fn find(&self, id: PriceListId) -> Result<PriceList, PortError> {
        let snapshot = self
            .lists
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found(PRICE_LIST_ENTITY, id))?;
        restore(snapshot)
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<PriceList>, PortError> {
        let snapshot = self
            .lists
            .read()
            .await
            .values()
            .find(|s| s.reference == reference)
            .cloned();
        snapshot.map(restore).transpose()
    }

    async fn save(&self, list: &mut PriceList) -> Result<(), PortError> {
        let snapshot = PriceListSnapshot::capture(list)
            .map_err(|e| PortError::corrupt(PRICE_LIST_ENTITY, list.id(), e.to_string()))?;
        let id = snapshot.id;

        let mut lists = self.lists.write().await;
        let stored = lists.get(&id).map(|s| s.version);
        if stored != list.persisted_version() {
            return Err(PortError::version_conflict(
                PRICE_LIST_ENTITY,
                id,
                list.persisted_version(),
                stored,
            ));
        }
        if lists
            .values()
            .any(|s| s.id != id && s.reference == snapshot.reference)
        {
            return Err(PortError::already_exists(PRICE_LIST_ENTITY, &snapshot.reference));
        }

        debug!(price_list_id = %id, version = snapshot.version, "price list saved");
        lists.insert(id, snapshot);
        list.mark_persisted();
        Ok(())
    }

    async fn delete(&self, id: PriceListId, expected_version: u64) -> Result<(), PortError> {
        let mut lists = self.lists.write().await;
        match lists.get(&id).map(|s| s.version) {
            None => Err(PortError::not_found(PRICE_LIST_ENTITY, id)),
            Some(actual) if actual != expected_version => Err(PortError::version_conflict(
                PRICE_LIST_ENTITY,
                id,
                Some(expected_version),
                Some(actual),
            )),
            Some(_) => {
                lists.remove(&id);
                Ok(())
            }
        }
    }
}

/// Rules kept in process memory, listed in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleStore {
    rules: Arc<RwLock<BTreeMap<RuleId, RuleRecord>>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with active records
    pub fn with_records(records: impl IntoIterator<Item = RuleRecord>) -> Self {
        let rules = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            rules: Arc::new(RwLock::new(rules)),
        }
    }
}

impl DomainPort for InMemoryRuleStore {}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn find_active_rules(&self) -> Result<Vec<IncompatibilityRule>, PortError> {
        Ok(self
            .rules
            .read()
            .await
            .values()
            .filter(|r| r.active)
            .map(|r| r.rule.clone())
            .collect())
    }

    async fn find_rule(&self, id: RuleId) -> Result<RuleRecord, PortError> {
        self.rules
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found(RULE_ENTITY, id))
    }

    async fn add_rule(&self, record: &RuleRecord) -> Result<(), PortError> {
        let mut rules = self.rules.write().await;
        if rules.contains_key(&record.id) {
            return Err(PortError::already_exists(RULE_ENTITY, record.id));
        }
        rules.insert(record.id, record.clone());
        Ok(())
    }

    async fn deactivate_rule(&self, id: RuleId) -> Result<(), PortError> {
        let mut rules = self.rules.write().await;
        let record = rules
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found(RULE_ENTITY, id))?;
        record.active = false;
        Ok(())
    }
}
