//! Pre-built Test Fixtures
//!
//! Consistent, predictable values for unit and service tests.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Actor, Currency, FixedClock, Money, Role};
use domain_pricing::{TierBucket, TierSchedule};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// An amount in USD at the currency's own precision
    ///
    /// # Panics
    ///
    /// Panics on a negative amount
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD).expect("valid USD amount")
    }

    /// An amount in EUR at the currency's own precision
    pub fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR).expect("valid EUR amount")
    }

    pub fn usd_100() -> Money {
        Self::usd(dec!(100.00))
    }

    pub fn eur_100() -> Money {
        Self::eur(dec!(100.00))
    }

    /// Zero-decimal currency
    pub fn jpy_10000() -> Money {
        Money::new(dec!(10000), Currency::JPY).expect("valid JPY amount")
    }
}

/// Fixture for audit instants
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// 2024-01-15 10:00:00 UTC
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
            .single()
            .expect("valid fixture instant")
    }

    /// A clock pinned at [`TemporalFixtures::epoch`]
    pub fn clock() -> FixedClock {
        FixedClock::at(Self::epoch())
    }
}

/// Fixture for callers holding each role
pub struct ActorFixtures;

impl ActorFixtures {
    pub fn viewer() -> Actor {
        Actor::new("viewer", [Role::Viewer])
    }

    pub fn editor() -> Actor {
        Actor::new("editor", [Role::PriceEditor])
    }

    pub fn manager() -> Actor {
        Actor::new("manager", [Role::CatalogManager])
    }

    pub fn admin() -> Actor {
        Actor::new("admin", [Role::Admin])
    }

    /// An actor with no roles at all
    pub fn anonymous() -> Actor {
        Actor::new("anonymous", Vec::<Role>::new())
    }
}

/// Fixture for tier schedules
pub struct TierFixtures;

impl TierFixtures {
    /// 0-10 at 5.00, 10+ at 4.00 (USD)
    pub fn two_tier_usd() -> TierSchedule {
        TierSchedule::new(vec![
            TierBucket::bounded(dec!(0), dec!(10), MoneyFixtures::usd(dec!(5.00)))
                .expect("valid bucket"),
            TierBucket::open(dec!(10), MoneyFixtures::usd(dec!(4.00))).expect("valid bucket"),
        ])
        .expect("valid schedule")
    }

    /// 0-100 at 1.00, 100-500 at 0.80, 500+ at 0.50 (EUR)
    pub fn three_tier_eur() -> TierSchedule {
        TierSchedule::new(vec![
            TierBucket::bounded(dec!(0), dec!(100), MoneyFixtures::eur(dec!(1.00)))
                .expect("valid bucket"),
            TierBucket::bounded(dec!(100), dec!(500), MoneyFixtures::eur(dec!(0.80)))
                .expect("valid bucket"),
            TierBucket::open(dec!(500), MoneyFixtures::eur(dec!(0.50))).expect("valid bucket"),
        ])
        .expect("valid schedule")
    }
}
