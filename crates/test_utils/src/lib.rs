//! Test Utilities Crate
//!
//! Shared test infrastructure for the catalog crates.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built money, actors, instants and tier schedules
//! - `builders`: Builders for price lists and rule records
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertion helpers with domain-aware messages
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
