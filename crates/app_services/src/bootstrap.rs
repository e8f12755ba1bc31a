//! Wiring of adapters into services
//!
//! The only place `anyhow` is used: start-up failures are reported to an
//! operator, not branched on.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use core_kernel::{AuthorizationPolicy, Clock, MonotonicClock, RoleBasedPolicy, SystemClock};
use domain_compatibility::RuleStore;
use domain_pricing::PriceListRepository;
use infra_db::{
    connect_and_migrate, InMemoryPriceListRepository, InMemoryRuleStore,
    PostgresPriceListRepository, PostgresRuleStore,
};

use crate::config::AppConfig;
use crate::configuration_service::ConfigurationService;
use crate::events::{EventPublisher, TracingEventPublisher};
use crate::price_list_service::PriceListService;
use crate::rule_authoring_service::RuleAuthoringService;

/// The collaborators every service is built from
pub struct Adapters {
    pub price_lists: Arc<dyn PriceListRepository>,
    pub rules: Arc<dyn RuleStore>,
    pub authorization: Arc<dyn AuthorizationPolicy>,
    pub clock: Arc<dyn Clock>,
    pub events: Arc<dyn EventPublisher>,
}

impl Adapters {
    /// In-memory stores, role-based authorization, wall clock
    pub fn in_memory() -> Self {
        Self {
            price_lists: Arc::new(InMemoryPriceListRepository::new()),
            rules: Arc::new(InMemoryRuleStore::new()),
            authorization: Arc::new(RoleBasedPolicy),
            clock: Arc::new(MonotonicClock::new(SystemClock)),
            events: Arc::new(TracingEventPublisher),
        }
    }
}

/// Ready-to-use application services
pub struct Services {
    pub price_lists: PriceListService,
    pub configuration: ConfigurationService,
    pub rules: RuleAuthoringService,
}

impl Services {
    pub fn assemble(adapters: Adapters, config: &AppConfig) -> Self {
        let Adapters {
            price_lists,
            rules,
            authorization,
            clock,
            events,
        } = adapters;

        Self {
            price_lists: PriceListService::new(
                price_lists,
                authorization.clone(),
                clock.clone(),
                events,
            )
            .with_max_bulk_percentage(config.max_bulk_adjustment_percentage),
            configuration: ConfigurationService::new(rules.clone(), authorization.clone()),
            rules: RuleAuthoringService::new(rules, authorization, clock),
        }
    }
}

/// Connects to PostgreSQL, applies migrations and wires the services
pub async fn connect(config: &AppConfig) -> anyhow::Result<Services> {
    let pool = connect_and_migrate(config.database_config())
        .await
        .context("preparing the catalog database")?;

    info!(
        max_connections = config.database.max_connections,
        "catalog services connected to PostgreSQL"
    );

    let adapters = Adapters {
        price_lists: Arc::new(PostgresPriceListRepository::new(pool.clone())),
        rules: Arc::new(PostgresRuleStore::new(pool)),
        authorization: Arc::new(RoleBasedPolicy),
        clock: Arc::new(MonotonicClock::new(SystemClock)),
        events: Arc::new(TracingEventPublisher),
    };
    Ok(Services::assemble(adapters, config))
}
