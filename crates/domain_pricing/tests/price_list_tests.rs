//! PriceList Aggregate Tests
//!
//! # Test Organization
//!
//! - `strategy_boundary` - insertions outside the boundary never mutate the list
//! - `price_operations` - set, remove, resolve and bulk adjustment
//! - `lifecycle` - activation, archival, soft and hard deletion
//! - `strategy_shift` - changing the boundary
//! - `properties` - version monotonicity under random operation sequences

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{ActorId, Currency, ItemId, Money};
use domain_pricing::{
    BulkAdjustment, PriceList, PriceListEvent, PricingError, PricingStrategy, QuantityKind,
    StrategyKind, TierBucket, TierSchedule,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

fn money(amount: Decimal, currency: Currency) -> Money {
    Money::new(amount, currency).expect("valid amount")
}

fn fixed(amount: Decimal, currency: Currency) -> PricingStrategy {
    PricingStrategy::fixed(money(amount, currency))
}

fn new_list(boundary: StrategyKind) -> (PriceList, ActorId) {
    let actor = ActorId::new();
    let list = PriceList::builder()
        .reference("TEST-LIST")
        .strategy_boundary(boundary)
        .created_by(actor)
        .created_at(t0())
        .build()
        .expect("Test price list creation should succeed");
    (list, actor)
}

fn active_list(boundary: StrategyKind) -> (PriceList, ActorId) {
    let (mut list, actor) = new_list(boundary);
    list.activate(t0(), actor).unwrap();
    list.take_events();
    (list, actor)
}

/// One strategy of every kind, all in EUR
fn one_of_each_kind() -> Vec<PricingStrategy> {
    let eur = |a: Decimal| money(a, Currency::EUR);
    let schedule = TierSchedule::new(vec![
        TierBucket::bounded(dec!(0), dec!(10), eur(dec!(2))).unwrap(),
        TierBucket::open(dec!(10), eur(dec!(1))).unwrap(),
    ])
    .unwrap();
    vec![
        PricingStrategy::fixed(eur(dec!(5))),
        PricingStrategy::scaled(eur(dec!(1)), eur(dec!(2)), QuantityKind::Fractional).unwrap(),
        PricingStrategy::scaled(eur(dec!(1)), eur(dec!(2)), QuantityKind::Integer).unwrap(),
        PricingStrategy::graduated(schedule.clone(), QuantityKind::Fractional),
        PricingStrategy::graduated(schedule.clone(), QuantityKind::Integer),
        PricingStrategy::volume(schedule.clone(), QuantityKind::Fractional),
        PricingStrategy::volume(schedule, QuantityKind::Integer),
        PricingStrategy::none(Currency::EUR),
    ]
}

mod strategy_boundary {
    use super::*;

    #[test]
    fn test_every_foreign_kind_is_rejected_without_mutation() {
        for boundary in StrategyKind::ALL {
            let (mut list, actor) = active_list(boundary);
            for strategy in one_of_each_kind() {
                let item = ItemId::new();
                let version = list.version();
                let result = list.add_or_update_price(item, Currency::EUR, strategy.clone(), t0(), actor);

                if strategy.kind() == boundary {
                    assert!(result.is_ok());
                    assert_eq!(list.version(), version + 1);
                } else {
                    assert_eq!(
                        result,
                        Err(PricingError::StrategyMismatch {
                            expected: boundary,
                            actual: strategy.kind(),
                        })
                    );
                    assert_eq!(list.version(), version);
                    assert!(list.strategy(item, Currency::EUR).is_none());
                }
            }
            assert_eq!(list.price_count(), 1);
        }
    }

    #[test]
    fn test_inactive_list_rejects_prices() {
        let (mut list, actor) = new_list(StrategyKind::Fixed);
        let result =
            list.add_or_update_price(ItemId::new(), Currency::EUR, fixed(dec!(1), Currency::EUR), t0(), actor);
        assert_eq!(result, Err(PricingError::NotActive));
        assert_eq!(list.version(), 1);
    }
}

mod price_operations {
    use super::*;

    #[test]
    fn test_set_then_resolve() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        let item = ItemId::new();
        list.add_or_update_price(item, Currency::EUR, fixed(dec!(12.50), Currency::EUR), t0(), actor)
            .unwrap();

        let price = list.resolve(item, Currency::EUR, dec!(3)).unwrap();
        assert_eq!(price, Some(money(dec!(12.50), Currency::EUR)));
        assert_eq!(list.resolve(item, Currency::USD, dec!(3)).unwrap(), None);
        assert_eq!(list.resolve(ItemId::new(), Currency::EUR, dec!(3)).unwrap(), None);
    }

    #[test]
    fn test_available_currencies() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        let item = ItemId::new();
        list.add_or_update_price(item, Currency::USD, fixed(dec!(1), Currency::USD), t0(), actor).unwrap();
        list.add_or_update_price(item, Currency::EUR, fixed(dec!(1), Currency::EUR), t0(), actor).unwrap();

        let currencies: Vec<_> = list.available_currencies(item).into_iter().collect();
        assert_eq!(currencies, vec![Currency::USD, Currency::EUR]);
        assert!(list.available_currencies(ItemId::new()).is_empty());
    }

    #[test]
    fn test_remove_last_currency_purges_target() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        let item = ItemId::new();
        list.add_or_update_price(item, Currency::USD, fixed(dec!(1), Currency::USD), t0(), actor).unwrap();
        list.add_or_update_price(item, Currency::EUR, fixed(dec!(1), Currency::EUR), t0(), actor).unwrap();

        list.remove_price(item, Currency::USD, t0(), actor).unwrap();
        assert!(list.price_table().contains_key(&item));

        list.remove_price(item, Currency::EUR, t0(), actor).unwrap();
        assert!(!list.price_table().contains_key(&item));
        assert!(list.available_currencies(item).is_empty());

        let events = list.take_events();
        assert!(matches!(
            events.last(),
            Some(PriceListEvent::PriceRemoved { target_purged: true, .. })
        ));
    }

    #[test]
    fn test_remove_missing_price() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        let version = list.version();
        let result = list.remove_price(ItemId::new(), Currency::EUR, t0(), actor);
        assert!(matches!(result, Err(PricingError::PriceNotFound { .. })));
        assert_eq!(list.version(), version);
    }

    #[test]
    fn test_bulk_adjustment_scales_everything_once() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        let a = ItemId::new();
        let b = ItemId::new();
        list.add_or_update_price(a, Currency::EUR, fixed(dec!(100.00), Currency::EUR), t0(), actor).unwrap();
        list.add_or_update_price(a, Currency::USD, fixed(dec!(50.00), Currency::USD), t0(), actor).unwrap();
        list.add_or_update_price(b, Currency::EUR, fixed(dec!(9.99), Currency::EUR), t0(), actor).unwrap();
        let version = list.version();

        let adjustment = BulkAdjustment::new("yearly increase", dec!(20)).unwrap();
        list.apply_bulk_adjustment(&adjustment, t0(), actor).unwrap();

        assert_eq!(list.version(), version + 1);
        assert_eq!(
            list.resolve(a, Currency::EUR, dec!(1)).unwrap(),
            Some(money(dec!(120.00), Currency::EUR))
        );
        assert_eq!(
            list.resolve(a, Currency::USD, dec!(1)).unwrap(),
            Some(money(dec!(60.00), Currency::USD))
        );
        // 9.99 * 1.2 = 11.988
        assert_eq!(
            list.resolve(b, Currency::EUR, dec!(1)).unwrap(),
            Some(money(dec!(11.99), Currency::EUR))
        );
    }

    #[test]
    fn test_bulk_adjustment_on_inactive_list_changes_nothing() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        let item = ItemId::new();
        list.add_or_update_price(item, Currency::EUR, fixed(dec!(10), Currency::EUR), t0(), actor).unwrap();
        list.deactivate(t0(), actor).unwrap();
        let before = list.price_table();
        let version = list.version();

        let adjustment = BulkAdjustment::new("sale", dec!(-50)).unwrap();
        assert_eq!(
            list.apply_bulk_adjustment(&adjustment, t0(), actor),
            Err(PricingError::NotActive)
        );
        assert_eq!(list.price_table(), before);
        assert_eq!(list.version(), version);
    }

    #[test]
    fn test_price_table_is_a_copy() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        let item = ItemId::new();
        list.add_or_update_price(item, Currency::EUR, fixed(dec!(10), Currency::EUR), t0(), actor).unwrap();

        let mut copy = list.price_table();
        copy.clear();
        assert_eq!(list.price_count(), 1);
    }

    #[test]
    fn test_audit_stamp_follows_last_change() {
        let (mut list, _) = active_list(StrategyKind::Fixed);
        let editor = ActorId::new();
        let later = t0() + Duration::minutes(5);
        list.add_or_update_price(ItemId::new(), Currency::EUR, fixed(dec!(1), Currency::EUR), later, editor)
            .unwrap();

        assert_eq!(list.audit().last_modified_at(), later);
        assert_eq!(list.audit().last_modified_by(), editor);
        assert_eq!(list.audit().created_at(), t0());
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn test_soft_deleted_list_resolves_nothing_until_restored() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        let item = ItemId::new();
        list.add_or_update_price(item, Currency::EUR, fixed(dec!(3), Currency::EUR), t0(), actor).unwrap();

        list.soft_delete(t0(), actor).unwrap();
        assert_eq!(list.resolve(item, Currency::EUR, dec!(1)).unwrap(), None);
        assert!(matches!(
            list.activate(t0(), actor),
            Err(PricingError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            list.add_or_update_price(item, Currency::EUR, fixed(dec!(4), Currency::EUR), t0(), actor),
            Err(PricingError::InvalidStateTransition { .. })
        ));

        list.restore(t0(), actor).unwrap();
        assert!(list.resolve(item, Currency::EUR, dec!(1)).unwrap().is_some());
    }

    #[test]
    fn test_restore_when_not_deleted_is_a_no_op() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        let version = list.version();
        list.restore(t0(), actor).unwrap();
        assert_eq!(list.version(), version);
        assert!(list.take_events().is_empty());
    }

    #[test]
    fn test_archive_round_trip() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        list.archive(t0(), actor).unwrap();
        assert!(!list.is_active());
        assert!(list.archive(t0(), actor).is_err());
        assert!(list.activate(t0(), actor).is_err());

        list.unarchive(t0(), actor).unwrap();
        list.activate(t0(), actor).unwrap();
        assert!(list.is_active());
    }

    #[test]
    fn test_deactivate_inactive_fails() {
        let (mut list, actor) = new_list(StrategyKind::Fixed);
        assert!(matches!(
            list.deactivate(t0(), actor),
            Err(PricingError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_hard_delete_allowed_after_soft_delete() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        list.soft_delete(t0(), actor).unwrap();
        let version = list.version();
        let event = list.hard_delete(t0(), actor);
        assert_eq!(event.event_type(), "PriceListHardDeleted");
        assert!(matches!(
            event,
            PriceListEvent::PriceListHardDeleted { final_version, .. } if final_version == version
        ));
    }
}

mod strategy_shift {
    use super::*;

    #[test]
    fn test_shift_on_empty_list() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        list.shift_strategy(StrategyKind::TieredVolume, t0(), actor).unwrap();
        assert_eq!(list.strategy_boundary(), StrategyKind::TieredVolume);

        let events = list.take_events();
        assert!(matches!(
            events.as_slice(),
            [PriceListEvent::StrategyShifted {
                from: StrategyKind::Fixed,
                to: StrategyKind::TieredVolume,
                ..
            }]
        ));
    }

    #[test]
    fn test_shift_blocked_while_prices_exist() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        list.add_or_update_price(ItemId::new(), Currency::EUR, fixed(dec!(1), Currency::EUR), t0(), actor)
            .unwrap();
        let version = list.version();

        assert!(matches!(
            list.shift_strategy(StrategyKind::None, t0(), actor),
            Err(PricingError::InvalidStateTransition { .. })
        ));
        assert_eq!(list.strategy_boundary(), StrategyKind::Fixed);
        assert_eq!(list.version(), version);
    }

    #[test]
    fn test_shift_to_same_kind_rejected() {
        let (mut list, actor) = active_list(StrategyKind::Fixed);
        assert!(matches!(
            list.shift_strategy(StrategyKind::Fixed, t0(), actor),
            Err(PricingError::Validation(_))
        ));
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use test_utils::{adjustment_percentage_strategy, money_strategy, strategy_kind_strategy};

    #[derive(Debug, Clone)]
    enum Op {
        Set(usize, Money),
        Remove(usize),
        Bulk(Decimal),
        Toggle,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3, money_strategy(Currency::EUR)).prop_map(|(t, price)| Op::Set(t, price)),
            (0usize..3).prop_map(Op::Remove),
            adjustment_percentage_strategy().prop_map(Op::Bulk),
            Just(Op::Toggle),
        ]
    }

    proptest! {
        #[test]
        fn version_moves_by_one_on_success_and_never_on_failure(ops in prop::collection::vec(op(), 1..40)) {
            let (mut list, actor) = active_list(StrategyKind::Fixed);
            let targets = [ItemId::new(), ItemId::new(), ItemId::new()];

            for op in ops {
                let before = list.version();
                let result = match op {
                    Op::Set(t, price) => list.add_or_update_price(
                        targets[t],
                        Currency::EUR,
                        PricingStrategy::fixed(price),
                        t0(),
                        actor,
                    ),
                    Op::Remove(t) => list.remove_price(targets[t], Currency::EUR, t0(), actor),
                    Op::Bulk(p) => {
                        let adjustment = BulkAdjustment::new("property", p).unwrap();
                        list.apply_bulk_adjustment(&adjustment, t0(), actor)
                    }
                    Op::Toggle => {
                        if list.is_active() {
                            list.deactivate(t0(), actor)
                        } else {
                            list.activate(t0(), actor)
                        }
                    }
                };
                let expected = if result.is_ok() { before + 1 } else { before };
                prop_assert_eq!(list.version(), expected);

                for by_currency in list.price_table().values() {
                    prop_assert!(!by_currency.is_empty());
                    for strategy in by_currency.values() {
                        prop_assert_eq!(strategy.kind(), StrategyKind::Fixed);
                    }
                }
            }
        }

        #[test]
        fn empty_list_shifts_to_any_other_boundary(
            from in strategy_kind_strategy(),
            to in strategy_kind_strategy(),
        ) {
            let (mut list, actor) = new_list(from);
            let before = list.version();
            let result = list.shift_strategy(to, t0(), actor);

            if from == to {
                prop_assert!(matches!(result, Err(PricingError::Validation(_))));
                prop_assert_eq!(list.version(), before);
            } else {
                prop_assert!(result.is_ok());
                prop_assert_eq!(list.strategy_boundary(), to);
                prop_assert_eq!(list.version(), before + 1);
            }
        }
    }
}
