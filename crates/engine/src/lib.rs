//! Larder Engine - persistence and services for recipe-to-inventory
//! resolution and deduction.
//!
//! # Services
//!
//! - [`services::registry`] - versioned recipe template storage
//! - [`services::projector`] - idempotent template fan-out to stores
//! - [`services::availability`] - on-demand producibility reports
//! - [`services::deduction`] - sale-time validation and atomic stock commit
//! - [`services::reorder`] - advisory replenishment scanning
//!
//! # Database
//!
//! PostgreSQL via sqlx; schema lives in `migrations/` and is embedded into
//! [`MIGRATOR`]. Run it with `larder migrate` or directly:
//!
//! ```rust,ignore
//! larder_engine::MIGRATOR.run(&pool).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod services;

/// Embedded schema migrations for the engine database.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
