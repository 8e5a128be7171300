//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LARDER_DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `LARDER_DEFAULT_REORDER_QUANTITY` - quantity requested for low-stock
//!   items that have no `maximum_capacity` on record (default: 50)

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_REORDER_QUANTITY: i64 = 50;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Fallback reorder quantity when an item has no capacity configured
    pub default_reorder_quantity: Decimal,
}

impl EngineConfig {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("LARDER_DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("LARDER_DATABASE_URL".to_string()))?
            .into();

        let default_reorder_quantity = match std::env::var("LARDER_DEFAULT_REORDER_QUANTITY") {
            Ok(raw) => raw.parse::<Decimal>().map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "LARDER_DEFAULT_REORDER_QUANTITY".to_string(),
                    e.to_string(),
                )
            })?,
            Err(_) => Decimal::from(DEFAULT_REORDER_QUANTITY),
        };

        Ok(Self {
            database_url,
            default_reorder_quantity,
        })
    }
}
