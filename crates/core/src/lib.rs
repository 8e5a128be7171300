//! Larder Core - Shared types and pure domain logic.
//!
//! This crate provides the types and algorithms used across all Larder
//! components:
//! - `engine` - Persistence layer and stateful services (deduction, deployment)
//! - `cli` - Command-line tools for migrations, imports, and store operations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access. Everything here can be unit-tested with plain structs:
//!
//! - [`matcher`] - Resolve free-text ingredient names to inventory items
//! - [`availability`] - Producibility projection for a resolved recipe
//! - [`deduction`] - Dry-run planning for sale-time stock deduction
//! - [`import`] - Template row grouping and definition validation
//!
//! The `engine` crate loads rows from PostgreSQL, calls into these modules,
//! and commits the results.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod availability;
pub mod deduction;
pub mod import;
pub mod matcher;
pub mod model;
pub mod types;

pub use model::*;
pub use types::*;
