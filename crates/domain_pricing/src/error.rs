//! Pricing domain errors
//!
//! This module defines all error types that can occur within the pricing
//! domain: value validation, strategy-boundary enforcement, price list
//! lifecycle and lookups.

use thiserror::Error;

use core_kernel::MoneyError;

use crate::strategy::StrategyKind;

/// Errors that can occur in the pricing domain
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A value failed structural validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Required field is missing
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// The strategy variant differs from the one the price list is locked to
    #[error("Strategy mismatch: price list accepts {expected}, got {actual}")]
    StrategyMismatch {
        expected: StrategyKind,
        actual: StrategyKind,
    },

    /// A strategy was stored under a currency it is not denominated in
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid lifecycle transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    /// Price mutations require an active list
    #[error("Price list is not active")]
    NotActive,

    /// No price stored for the target/currency pair
    #[error("No price for target {target} in {currency}")]
    PriceNotFound {
        target: String,
        currency: String,
    },

    /// Monetary arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl PricingError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PricingError::Validation(message.into())
    }

    /// Creates an invalid transition error
    pub fn transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        PricingError::InvalidStateTransition {
            from: from.into(),
            to: to.into(),
        }
    }
}
