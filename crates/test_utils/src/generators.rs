//! Property-Based Test Generators
//!
//! Proptest strategies that only produce values satisfying domain invariants.

use core_kernel::{Currency, Money};
use domain_compatibility::CompatibilityTag;
use domain_pricing::{QuantityKind, StrategyKind, TierBucket, TierSchedule};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Any supported currency
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    proptest::sample::select(Currency::ALL.to_vec())
}

/// Any strategy discriminator
pub fn strategy_kind_strategy() -> impl Strategy<Value = StrategyKind> {
    proptest::sample::select(StrategyKind::ALL.to_vec())
}

pub fn quantity_kind_strategy() -> impl Strategy<Value = QuantityKind> {
    prop_oneof![Just(QuantityKind::Fractional), Just(QuantityKind::Integer)]
}

/// Non-negative money in `currency`, below one million major units
pub fn money_strategy(currency: Currency) -> impl Strategy<Value = Money> {
    let scale = currency.minor_units();
    (0i64..100_000_000i64).prop_map(move |minor| {
        Money::new(Decimal::new(minor, scale), currency).expect("non-negative amount")
    })
}

/// Quantities from 0 to 10 000 with up to two decimals
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Bulk adjustment percentages inside (-100, 1000]
pub fn adjustment_percentage_strategy() -> impl Strategy<Value = Decimal> {
    (-9_999i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Contiguous schedules of one to five buckets, starting at zero and ending
/// open
pub fn tier_schedule_strategy(currency: Currency) -> impl Strategy<Value = TierSchedule> {
    prop::collection::vec((1u32..50u32, money_strategy(currency)), 1..5).prop_map(|specs| {
        let last = specs.len() - 1;
        let mut min = Decimal::ZERO;
        let buckets = specs
            .into_iter()
            .enumerate()
            .map(|(i, (width, price))| {
                let bucket = if i == last {
                    TierBucket::open(min, price)
                } else {
                    TierBucket::bounded(min, min + Decimal::from(width), price)
                };
                min += Decimal::from(width);
                bucket.expect("contiguous bucket")
            })
            .collect();
        TierSchedule::new(buckets).expect("contiguous schedule")
    })
}

/// Tags drawn from a small alphabet so generated rules collide often
pub fn tag_strategy() -> impl Strategy<Value = CompatibilityTag> {
    proptest::sample::select(vec!["outdoor", "metal-only", "eco", "heavy", "fragile"])
        .prop_map(|t| CompatibilityTag::new(t).expect("valid tag"))
}
