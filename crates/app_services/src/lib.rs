//! Application Services
//!
//! The use-case layer over the pricing and compatibility domains. Each
//! service receives its collaborators (repository or rule store,
//! authorization policy, clock) at construction and checks the caller's
//! capability before doing anything else.
//!
//! # Example
//!
//! ```rust,ignore
//! use app_services::{bootstrap, telemetry, AppConfig};
//!
//! let config = AppConfig::load()?;
//! telemetry::init_tracing(&config)?;
//! let services = bootstrap::connect(&config).await?;
//!
//! let list = services.price_lists.create(&actor, "EU-RETAIL", StrategyKind::Fixed).await?;
//! ```

pub mod config;
pub mod telemetry;
pub mod error;
pub mod events;
pub mod price_list_service;
pub mod configuration_service;
pub mod rule_authoring_service;
pub mod bootstrap;

pub use config::{AppConfig, DatabaseSettings, LogFormat};
pub use error::{ErrorKind, ServiceError};
pub use events::{EventPublisher, RecordingEventPublisher, TracingEventPublisher};
pub use price_list_service::PriceListService;
pub use configuration_service::ConfigurationService;
pub use rule_authoring_service::RuleAuthoringService;
pub use bootstrap::{Adapters, Services};
