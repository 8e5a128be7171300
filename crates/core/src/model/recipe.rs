//! Per-store recipe instances and the sellable catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::matcher::MatchConfidence;
use crate::types::{
    CatalogEntryId, CategoryId, InventoryItemId, RecipeId, RecipeIngredientId, StoreId, TemplateId,
};

/// The store-scoped materialization of a [`super::RecipeTemplate`].
///
/// At most one recipe exists per (template, store) pair while the template
/// is active; deployment enforces this with an existence check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub store_id: StoreId,
    /// Provenance link back to the template this recipe was projected from.
    pub template_id: TemplateId,
    pub name: String,
    pub yield_quantity: Decimal,
    pub serving_size: Decimal,
    pub total_cost: Decimal,
    pub price: Decimal,
    pub is_active: bool,
}

/// One resolved ingredient row of a per-store recipe.
///
/// `mapping` is `None` when the matcher found no inventory item for the
/// authored name. That is a valid, common state: the ingredient is surfaced
/// for manual resolution and renders the recipe non-producible meanwhile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: RecipeIngredientId,
    pub recipe_id: RecipeId,
    pub ingredient_name: String,
    /// Quantity required per single yield unit, in `unit`.
    pub quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Decimal,
    pub mapping: Option<IngredientMapping>,
}

/// Derived, non-authoritative link from an authored ingredient name to a
/// concrete inventory item within one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientMapping {
    pub inventory_item_id: InventoryItemId,
    pub confidence: MatchConfidence,
    /// Multiplier converting quantities in the recipe's unit into the
    /// inventory item's unit.
    pub conversion_factor: Decimal,
}

/// A sellable product row shown at point of sale.
///
/// "Direct products" (bottled drinks, retail packs) have no recipe and
/// therefore no inventory effect at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: CatalogEntryId,
    pub store_id: StoreId,
    pub recipe_id: Option<RecipeId>,
    pub category_id: CategoryId,
    pub name: String,
    pub price: Decimal,
    pub is_available: bool,
}

impl CatalogEntry {
    /// Whether this entry sells without any recipe-backed deduction.
    #[must_use]
    pub const fn is_direct_product(&self) -> bool {
        self.recipe_id.is_none()
    }
}

/// A store-scoped organizational category for catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub store_id: StoreId,
    pub name: String,
    pub is_active: bool,
}
