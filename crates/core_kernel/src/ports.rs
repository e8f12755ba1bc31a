//! Ports and Adapters Infrastructure
//!
//! Shared error types for the port traits each domain defines
//! towards its collaborators (repositories, rule stores).
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │          Application Services            │
//! └──────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────┐
//! │  Port Traits (PriceListRepository,       │
//! │  RuleStore) defined in each domain       │
//! └──────────────────────────────────────────┘
//!            ▲                    ▲
//!   ┌────────┴───────┐   ┌───────┴────────┐
//!   │   PostgreSQL   │   │   In-memory    │
//!   └────────────────┘   └────────────────┘
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// An entity with the same unique key already exists
    #[error("Already exists: {entity_type} with key {key}")]
    AlreadyExists {
        entity_type: String,
        key: String,
    },

    /// The stored version no longer matches the version the caller loaded
    #[error("Concurrency conflict on {entity_type} {id}: expected version {expected:?}, found {actual:?}")]
    VersionConflict {
        entity_type: String,
        id: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    /// Stored data could not be decoded back into a domain value
    #[error("Corrupt record for {entity_type} {id}: {message}")]
    CorruptRecord {
        entity_type: String,
        id: String,
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates an AlreadyExists error
    pub fn already_exists(entity_type: impl Into<String>, key: impl fmt::Display) -> Self {
        PortError::AlreadyExists {
            entity_type: entity_type.into(),
            key: key.to_string(),
        }
    }

    /// Creates a VersionConflict error
    pub fn version_conflict(
        entity_type: impl Into<String>,
        id: impl fmt::Display,
        expected: Option<u64>,
        actual: Option<u64>,
    ) -> Self {
        PortError::VersionConflict {
            entity_type: entity_type.into(),
            id: id.to_string(),
            expected,
            actual,
        }
    }

    /// Creates a CorruptRecord error
    pub fn corrupt(
        entity_type: impl Into<String>,
        id: impl fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        PortError::CorruptRecord {
            entity_type: entity_type.into(),
            id: id.to_string(),
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if the caller should reload and retry
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::VersionConflict { .. })
    }

    /// Returns true if a unique key is already taken
    pub fn is_already_exists(&self) -> bool {
        matches!(self, PortError::AlreadyExists { .. })
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
pub trait DomainPort: Send + Sync + 'static {}
