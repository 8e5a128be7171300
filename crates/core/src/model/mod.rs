//! Domain model for the resolution and deduction engine.
//!
//! These are plain data structs shared between the pure algorithms in this
//! crate and the persistence layer in `larder-engine`. Database mapping
//! (column names, row decoding) lives entirely in the engine crate.

pub mod audit;
pub mod inventory;
pub mod movement;
pub mod recipe;
pub mod reorder;
pub mod template;

pub use audit::{DeductionAudit, SyncStatus};
pub use inventory::{InventoryItem, StockStatus};
pub use movement::{MovementType, StockMovement};
pub use recipe::{CatalogEntry, Category, IngredientMapping, Recipe, RecipeIngredient};
pub use reorder::{ReorderLine, ReorderRequest};
pub use template::{IngredientDefinition, RecipeTemplate, TemplateDefinition, TemplateIngredient};
