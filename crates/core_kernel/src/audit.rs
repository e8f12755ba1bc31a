//! Audit time source and audit metadata
//!
//! Aggregates never read the wall clock themselves. Application services ask
//! a [`Clock`] for "now" and pass the instant into each operation, which keeps
//! domain logic deterministic under test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::identifiers::ActorId;

/// Source of audit timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wraps another clock and never returns an instant earlier than the last one
/// handed out, even if the underlying clock steps backwards.
pub struct MonotonicClock<C: Clock> {
    inner: C,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl<C: Clock> MonotonicClock<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&self) -> DateTime<Utc> {
        let candidate = self.inner.now();
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = match *last {
            Some(previous) if previous > candidate => previous,
            _ => candidate,
        };
        *last = Some(next);
        next
    }
}

/// A clock pinned to one instant that can be moved by hand. Intended for tests
/// and replays.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Moves the clock by `delta` (may be negative)
    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = match self.instant.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.instant.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Created / last-modified metadata carried by every aggregate
///
/// `last_modified_at` never moves backwards and is never earlier than
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    created_at: DateTime<Utc>,
    created_by: ActorId,
    last_modified_at: DateTime<Utc>,
    last_modified_by: ActorId,
}

impl AuditStamp {
    /// Stamp for a freshly created aggregate
    pub fn created(at: DateTime<Utc>, by: ActorId) -> Self {
        Self {
            created_at: at,
            created_by: by,
            last_modified_at: at,
            last_modified_by: by,
        }
    }

    /// Rebuilds a stamp loaded from storage, repairing an out-of-order
    /// modification time
    pub fn restore(
        created_at: DateTime<Utc>,
        created_by: ActorId,
        last_modified_at: DateTime<Utc>,
        last_modified_by: ActorId,
    ) -> Self {
        Self {
            created_at,
            created_by,
            last_modified_at: last_modified_at.max(created_at),
            last_modified_by,
        }
    }

    /// Returns a copy touched by `by` at `at`, clamped so time stays monotonic
    pub fn touched(&self, at: DateTime<Utc>, by: ActorId) -> Self {
        Self {
            created_at: self.created_at,
            created_by: self.created_by,
            last_modified_at: at.max(self.last_modified_at),
            last_modified_by: by,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn created_by(&self) -> ActorId {
        self.created_by
    }

    pub fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    pub fn last_modified_by(&self) -> ActorId {
        self.last_modified_by
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_monotonic_clock_never_goes_back() {
        let fixed = FixedClock::at(instant());
        let clock = MonotonicClock::new(fixed);

        let first = clock.now();
        clock.inner.advance(Duration::seconds(-30));
        let second = clock.now();

        assert_eq!(first, second);
    }

    #[test]
    fn test_touch_is_monotonic() {
        let actor = ActorId::new();
        let stamp = AuditStamp::created(instant(), actor);

        let earlier = stamp.touched(instant() - Duration::hours(1), actor);
        assert_eq!(earlier.last_modified_at(), instant());

        let later = stamp.touched(instant() + Duration::hours(1), actor);
        assert_eq!(later.last_modified_at(), instant() + Duration::hours(1));
        assert_eq!(later.created_at(), instant());
    }

    #[test]
    fn test_restore_repairs_modified_before_created() {
        let actor = ActorId::new();
        let stamp = AuditStamp::restore(instant(), actor, instant() - Duration::days(1), actor);
        assert_eq!(stamp.last_modified_at(), stamp.created_at());
    }
}
