//! PostgreSQL implementations of the domain ports
//!
//! Queries are built at runtime with `sqlx::query` and decoded column by
//! column, so the crate builds without a live database. Every write that
//! touches a versioned row is a compare-and-swap on the `version` column.

pub mod price_list;
pub mod rules;

pub use price_list::PostgresPriceListRepository;
pub use rules::PostgresRuleStore;
