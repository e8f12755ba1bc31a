//! Service configuration
//!
//! Loaded from `CATALOG_`-prefixed environment variables, after reading a
//! `.env` file if one is present. Nested keys use a double underscore:
//!
//! ```text
//! CATALOG_LOG_LEVEL=debug
//! CATALOG_LOG_FORMAT=json
//! CATALOG_DATABASE__URL=postgres://catalog:secret@db/catalog
//! CATALOG_DATABASE__MAX_CONNECTIONS=20
//! CATALOG_MAX_BULK_ADJUSTMENT_PERCENTAGE=250
//! ```

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use domain_pricing::BulkAdjustment;
use infra_db::{DatabaseConfig, DEFAULT_DATABASE_URL};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Connection pool settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 30,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    pub database: DatabaseSettings,
    /// Upper bound on a single bulk adjustment, tighter than the domain limit
    pub max_bulk_adjustment_percentage: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database: DatabaseSettings::default(),
            max_bulk_adjustment_percentage: BulkAdjustment::MAX_PERCENTAGE,
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if any) and then the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Loads configuration from `CATALOG_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(
            config::Environment::with_prefix("CATALOG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    /// Builds the configuration from defaults overlaid with `source`
    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();
        let config: AppConfig = config::Config::builder()
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default("database.min_connections", defaults.database.min_connections)?
            .set_default(
                "database.connect_timeout_secs",
                defaults.database.connect_timeout_secs,
            )?
            .set_default(
                "max_bulk_adjustment_percentage",
                defaults.max_bulk_adjustment_percentage.to_string(),
            )?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        let limit = self.max_bulk_adjustment_percentage;
        if limit <= Decimal::ZERO || limit > BulkAdjustment::MAX_PERCENTAGE {
            return Err(config::ConfigError::Message(format!(
                "max_bulk_adjustment_percentage must be in (0, {}], got {}",
                BulkAdjustment::MAX_PERCENTAGE,
                limit
            )));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(config::ConfigError::Message(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        Ok(())
    }

    /// Pool settings in the shape `infra_db` expects
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database.url.clone())
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .acquire_timeout(Duration::from_secs(self.database.connect_timeout_secs))
    }
}
