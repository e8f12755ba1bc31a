//! Infrastructure Database Layer
//!
//! Adapters for the pricing and compatibility ports: PostgreSQL via SQLx for
//! deployment, and in-memory maps for tests and local runs. Both honour the
//! same optimistic versioning contract.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{connect_and_migrate, DatabaseConfig, PostgresPriceListRepository};
//!
//! let pool = connect_and_migrate(DatabaseConfig::new("postgres://localhost/catalog")).await?;
//! let repository = PostgresPriceListRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod in_memory;

pub use pool::{
    connect_and_migrate, create_pool, ping, run_migrations, DatabaseConfig, DatabasePool,
    DEFAULT_DATABASE_URL,
};
pub use error::DatabaseError;
pub use repositories::{PostgresPriceListRepository, PostgresRuleStore};
pub use in_memory::{InMemoryPriceListRepository, InMemoryRuleStore};
