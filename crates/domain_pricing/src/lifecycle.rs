//! Price list lifecycle
//!
//! [`LifecycleState`] is an immutable value. Every transition returns a new
//! state and the aggregate swaps it in whole, so a rejected transition can
//! never leave a half-updated set of flags behind.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PricingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifecycleState {
    active: bool,
    archived: bool,
    soft_deleted: bool,
}

impl LifecycleState {
    /// State of a freshly created list: inactive, not archived, not deleted
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a state loaded from storage
    pub fn restore(active: bool, archived: bool, soft_deleted: bool) -> Self {
        Self {
            active,
            archived,
            soft_deleted,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn is_soft_deleted(&self) -> bool {
        self.soft_deleted
    }

    /// Short name used in transition errors
    pub fn label(&self) -> &'static str {
        if self.soft_deleted {
            "soft_deleted"
        } else if self.archived {
            "archived"
        } else if self.active {
            "active"
        } else {
            "inactive"
        }
    }

    pub fn activated(self) -> Result<Self, PricingError> {
        if self.soft_deleted || self.archived || self.active {
            return Err(PricingError::transition(self.label(), "active"));
        }
        Ok(Self {
            active: true,
            ..self
        })
    }

    pub fn deactivated(self) -> Result<Self, PricingError> {
        if self.soft_deleted || !self.active {
            return Err(PricingError::transition(self.label(), "inactive"));
        }
        Ok(Self {
            active: false,
            ..self
        })
    }

    /// Archiving also takes the list out of service
    pub fn archived(self) -> Result<Self, PricingError> {
        if self.soft_deleted || self.archived {
            return Err(PricingError::transition(self.label(), "archived"));
        }
        Ok(Self {
            active: false,
            archived: true,
            ..self
        })
    }

    /// Unarchived lists come back inactive
    pub fn unarchived(self) -> Result<Self, PricingError> {
        if self.soft_deleted || !self.archived {
            return Err(PricingError::transition(self.label(), "unarchived"));
        }
        Ok(Self {
            archived: false,
            ..self
        })
    }

    pub fn soft_deleted(self) -> Result<Self, PricingError> {
        if self.soft_deleted {
            return Err(PricingError::transition(self.label(), "soft_deleted"));
        }
        Ok(Self {
            soft_deleted: true,
            ..self
        })
    }

    /// `None` when there is nothing to restore
    pub fn restored(self) -> Option<Self> {
        self.soft_deleted.then_some(Self {
            soft_deleted: false,
            ..self
        })
    }

    /// Price mutations need a live, active list
    pub fn ensure_accepts_prices(&self) -> Result<(), PricingError> {
        if self.soft_deleted {
            return Err(PricingError::transition(self.label(), "price_change"));
        }
        if !self.active {
            return Err(PricingError::NotActive);
        }
        Ok(())
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_twice_fails() {
        let active = LifecycleState::new().activated().unwrap();
        assert!(active.is_active());
        assert!(matches!(
            active.activated(),
            Err(PricingError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_archive_deactivates() {
        let archived = LifecycleState::new()
            .activated()
            .unwrap()
            .archived()
            .unwrap();
        assert!(!archived.is_active());
        assert!(archived.activated().is_err());

        let back = archived.unarchived().unwrap();
        assert!(!back.is_archived());
        assert!(back.activated().is_ok());
    }

    #[test]
    fn test_soft_deleted_blocks_everything_but_restore() {
        let deleted = LifecycleState::new().activated().unwrap().soft_deleted().unwrap();
        assert!(deleted.deactivated().is_err());
        assert!(deleted.archived().is_err());
        assert!(deleted.soft_deleted().is_err());
        assert!(deleted.ensure_accepts_prices().is_err());

        let restored = deleted.restored().unwrap();
        assert!(restored.is_active());
        assert!(restored.restored().is_none());
    }

    #[test]
    fn test_inactive_list_rejects_prices() {
        assert_eq!(
            LifecycleState::new().ensure_accepts_prices(),
            Err(PricingError::NotActive)
        );
    }
}
