//! Core types for Larder.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod unit;

pub use id::*;
pub use unit::{conversion_factor, is_recipe_compatible_unit, normalize_unit};
