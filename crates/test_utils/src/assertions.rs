//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than bare `assert_eq!`.

use core_kernel::{Currency, ItemId, Money, PortError};
use domain_compatibility::ValidationResult;
use domain_pricing::PriceList;
use rust_decimal::Decimal;

/// Asserts a money value's amount and currency
pub fn assert_money(actual: &Money, amount: Decimal, currency: Currency) {
    assert_eq!(
        (actual.amount(), actual.currency()),
        (amount, currency),
        "Expected {} {}, got {}",
        amount,
        currency,
        actual
    );
}

/// Asserts the price a list resolves for `target` at `quantity`
///
/// # Panics
///
/// Panics if resolution errors, yields no price, or yields a different amount
pub fn assert_resolves_to(
    list: &PriceList,
    target: ItemId,
    currency: Currency,
    quantity: Decimal,
    amount: Decimal,
) {
    match list.resolve(target, currency, quantity) {
        Ok(Some(price)) => assert_money(&price, amount, currency),
        Ok(None) => panic!("Expected {} {} for {}, but no price resolved", amount, currency, target),
        Err(e) => panic!("Resolving {} in {} failed: {}", target, currency, e),
    }
}

/// Asserts that a validation failed with exactly these violating ids
pub fn assert_violations(result: &ValidationResult, expected: &[ItemId]) {
    let mut actual: Vec<ItemId> = result.violations().iter().map(|f| f.id).collect();
    let mut expected = expected.to_vec();
    actual.sort();
    expected.sort();
    assert!(
        !result.is_valid() || expected.is_empty(),
        "Expected violations {:?}, but the selection was valid",
        expected
    );
    assert_eq!(actual, expected, "Violation mismatch: {}", result.message().unwrap_or("valid"));
}

/// Asserts that a port call failed on an optimistic version check
pub fn assert_version_conflict<T: std::fmt::Debug>(result: Result<T, PortError>) {
    match result {
        Err(e) if e.is_conflict() => {}
        other => panic!("Expected a version conflict, got {:?}", other),
    }
}
