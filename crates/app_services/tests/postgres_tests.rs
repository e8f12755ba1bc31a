//! PostgreSQL Adapter Tests
//!
//! Run against a throwaway container; ignored by default because they need a
//! Docker daemon:
//!
//! ```text
//! cargo test -p app_services --test postgres_tests -- --ignored
//! ```

use std::sync::Arc;

use core_kernel::{Currency, ItemId, RoleBasedPolicy};
use domain_compatibility::{RuleStore, SelectedFeature};
use domain_pricing::{PriceListRepository, PricingStrategy, QuantityKind, StrategyKind};
use infra_db::{PostgresPriceListRepository, PostgresRuleStore};
use rust_decimal_macros::dec;

use app_services::{ConfigurationService, ErrorKind, PriceListService, RecordingEventPublisher};
use test_utils::{
    assert_resolves_to, assert_version_conflict, assert_violations, create_isolated_test_database,
    ActorFixtures, MoneyFixtures, TemporalFixtures, TestPriceListBuilder, TestRuleBuilder,
    TierFixtures,
};

#[tokio::test]
#[ignore = "requires docker"]
async fn test_price_list_round_trip_keeps_tiers_and_version() {
    let db = create_isolated_test_database().await.unwrap();
    let repository = PostgresPriceListRepository::new(db.pool().clone());
    let item = ItemId::new();
    let author = ActorFixtures::manager().id;
    let created = TemporalFixtures::epoch() + chrono::Duration::days(3);

    let mut list = TestPriceListBuilder::new()
        .with_reference("US-TIERED")
        .with_boundary(StrategyKind::TieredGraduatedInteger)
        .with_actor(author)
        .with_timestamp(created)
        .with_price(
            item,
            PricingStrategy::graduated(TierFixtures::two_tier_usd(), QuantityKind::Integer),
        )
        .build();
    repository.save(&mut list).await.unwrap();

    let loaded = repository.find(list.id()).await.unwrap();
    assert_eq!(loaded.version(), list.version());
    assert_eq!(loaded.persisted_version(), Some(list.version()));
    assert_eq!(loaded.price_table(), list.price_table());
    assert_resolves_to(&loaded, item, Currency::USD, dec!(15.7), dec!(70.00));
    assert_eq!(loaded.audit().created_by(), author);
    assert_eq!(loaded.audit().created_at(), created);
    assert_eq!(loaded.audit().last_modified_by(), author);

    let by_reference = repository.find_by_reference("US-TIERED").await.unwrap();
    assert_eq!(by_reference.map(|l| l.id()), Some(list.id()));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_stale_update_is_a_version_conflict() {
    let db = create_isolated_test_database().await.unwrap();
    let repository = PostgresPriceListRepository::new(db.pool().clone());
    let at = TemporalFixtures::epoch();
    let actor = ActorFixtures::editor().id;

    let mut list = TestPriceListBuilder::new().active().build();
    repository.save(&mut list).await.unwrap();

    let mut first = repository.find(list.id()).await.unwrap();
    let mut second = repository.find(list.id()).await.unwrap();

    first.deactivate(at, actor).unwrap();
    repository.save(&mut first).await.unwrap();

    second.archive(at, actor).unwrap();
    assert_version_conflict(repository.save(&mut second).await);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_duplicate_reference_is_reported_as_already_exists() {
    let db = create_isolated_test_database().await.unwrap();
    let repository = PostgresPriceListRepository::new(db.pool().clone());

    let mut first = TestPriceListBuilder::new().with_reference("EU-RETAIL").build();
    let mut second = TestPriceListBuilder::new().with_reference("EU-RETAIL").build();
    repository.save(&mut first).await.unwrap();

    let error = repository.save(&mut second).await.unwrap_err();
    assert!(error.is_already_exists());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_hard_delete_through_the_service() {
    let db = create_isolated_test_database().await.unwrap();
    let events = Arc::new(RecordingEventPublisher::new());
    let service = PriceListService::new(
        Arc::new(PostgresPriceListRepository::new(db.pool().clone())),
        Arc::new(RoleBasedPolicy),
        Arc::new(TemporalFixtures::clock()),
        events.clone(),
    );
    let admin = ActorFixtures::admin();

    let list = service.create(&admin, "TO-DELETE", StrategyKind::Fixed).await.unwrap();
    service.activate(&admin, list.id()).await.unwrap();
    service
        .set_price(&admin, list.id(), ItemId::new(), Currency::EUR, PricingStrategy::fixed(MoneyFixtures::eur_100()))
        .await
        .unwrap();
    service.hard_delete(&admin, list.id()).await.unwrap();

    let error = service.get(&admin, list.id()).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(events.event_types().last(), Some(&"PriceListHardDeleted"));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_rule_store_feeds_validation() {
    let db = create_isolated_test_database().await.unwrap();
    let store = Arc::new(PostgresRuleStore::new(db.pool().clone()));
    let a = ItemId::new();
    let b = ItemId::new();

    let active = TestRuleBuilder::forbidding(b).triggered_by(a).build();
    let retired = TestRuleBuilder::forbidding(a).triggered_by_tag("eco").build();
    store.add_rule(&active).await.unwrap();
    store.add_rule(&retired).await.unwrap();
    store.deactivate_rule(retired.id).await.unwrap();

    assert!(store.add_rule(&active).await.unwrap_err().is_already_exists());
    assert_eq!(store.find_active_rules().await.unwrap(), vec![active.rule.clone()]);
    assert!(!store.find_rule(retired.id).await.unwrap().active);

    let configuration = ConfigurationService::new(store, Arc::new(RoleBasedPolicy));
    let result = configuration
        .validate_selection(
            &ActorFixtures::viewer(),
            &[SelectedFeature::untagged(a), SelectedFeature::untagged(b)],
            &[],
        )
        .await
        .unwrap();
    assert_violations(&result, &[b]);
}
