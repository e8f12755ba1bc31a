//! Application service errors
//!
//! Every failure a caller can see, with a stable short code per kind.

use thiserror::Error;

use core_kernel::{AuthorizationError, PortError, CAPABILITY_MISSING};
use domain_compatibility::CompatibilityError;
use domain_pricing::PricingError;

/// Coarse failure kinds callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    State,
    StrategyMismatch,
    NotFound,
    Conflict,
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Compatibility(#[from] CompatibilityError),

    #[error(transparent)]
    Port(#[from] PortError),

    /// A request within domain limits but outside configured policy
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Authorization(_) => ErrorKind::Authorization,
            ServiceError::Pricing(e) => match e {
                PricingError::StrategyMismatch { .. } => ErrorKind::StrategyMismatch,
                PricingError::InvalidStateTransition { .. } | PricingError::NotActive => {
                    ErrorKind::State
                }
                PricingError::PriceNotFound { .. } => ErrorKind::NotFound,
                PricingError::Validation(_)
                | PricingError::MissingRequiredField(_)
                | PricingError::CurrencyMismatch { .. }
                | PricingError::Money(_) => ErrorKind::Validation,
            },
            ServiceError::Compatibility(_) | ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Port(e) => match e {
                PortError::NotFound { .. } => ErrorKind::NotFound,
                PortError::VersionConflict { .. } | PortError::AlreadyExists { .. } => {
                    ErrorKind::Conflict
                }
                PortError::CorruptRecord { .. }
                | PortError::Connection { .. }
                | PortError::Internal { .. } => ErrorKind::Infrastructure,
            },
        }
    }

    /// Stable code for logs and API mappings
    pub fn code(&self) -> &'static str {
        match (self, self.kind()) {
            (ServiceError::Authorization(e), _) => e.code,
            (ServiceError::Port(PortError::AlreadyExists { .. }), _) => "ALREADY_EXISTS",
            (_, ErrorKind::Validation) => "VALIDATION_FAILED",
            (_, ErrorKind::Authorization) => CAPABILITY_MISSING,
            (_, ErrorKind::State) => "INVALID_STATE",
            (_, ErrorKind::StrategyMismatch) => "STRATEGY_MISMATCH",
            (_, ErrorKind::NotFound) => "NOT_FOUND",
            (_, ErrorKind::Conflict) => "VERSION_CONFLICT",
            (_, ErrorKind::Infrastructure) => "INFRASTRUCTURE",
        }
    }

    /// True when reloading and retrying could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Port(e) if e.is_conflict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{ActorId, Capability};
    use domain_pricing::StrategyKind;

    #[test]
    fn test_codes_per_kind() {
        let denied = ServiceError::from(AuthorizationError {
            code: CAPABILITY_MISSING,
            actor: ActorId::new(),
            capability: Capability::HardDeletePriceLists,
        });
        assert_eq!(denied.code(), "AUTHZ_CAPABILITY_MISSING");

        let mismatch = ServiceError::from(PricingError::StrategyMismatch {
            expected: StrategyKind::Fixed,
            actual: StrategyKind::Scaled,
        });
        assert_eq!(mismatch.kind(), ErrorKind::StrategyMismatch);
        assert_eq!(mismatch.code(), "STRATEGY_MISMATCH");

        let conflict = ServiceError::from(PortError::version_conflict("PriceList", "x", Some(1), Some(2)));
        assert_eq!(conflict.code(), "VERSION_CONFLICT");
        assert!(conflict.is_retryable());

        let taken = ServiceError::from(PortError::already_exists("PriceList", "EU"));
        assert_eq!(taken.code(), "ALREADY_EXISTS");
        assert!(!taken.is_retryable());
    }

    #[test]
    fn test_not_active_is_a_state_error() {
        assert_eq!(ServiceError::from(PricingError::NotActive).kind(), ErrorKind::State);
    }
}
