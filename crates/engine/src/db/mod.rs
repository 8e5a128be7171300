//! Database operations for the engine's `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `stores` - store registry (fan-out targets)
//! - `inventory_items` - store-scoped physical stock
//! - `recipe_templates` / `template_ingredients` - store-independent definitions
//! - `recipes` / `recipe_ingredients` - per-store materializations with mappings
//! - `categories` / `catalog_entries` - the sellable catalog
//! - `stock_movements` - append-only audit ledger
//! - `reorder_requests` / `reorder_lines` - replenishment requests
//! - `deduction_audit` - one row per deduction call
//!
//! # Migrations
//!
//! Migrations are stored in `crates/engine/migrations/` and run via:
//! ```bash
//! cargo run -p larder-cli -- migrate
//! ```
//!
//! Modules expose free async functions taking any `PgExecutor`, so the same
//! query runs against the pool or inside a transaction.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod audit;
pub mod inventory;
pub mod movements;
pub mod recipes;
pub mod reorders;
pub mod stores;
pub mod templates;

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate deployment).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
