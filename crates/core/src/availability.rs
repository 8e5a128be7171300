//! Producibility projection for a resolved recipe.
//!
//! This is a read-only view recomputed on demand; it persists nothing. The
//! engine loads a recipe's ingredient rows joined against live stock, builds
//! [`ResolvedIngredient`]s, and calls [`analyze`].

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::InventoryItemId;

/// Marker appended to ingredient names that resolve to no inventory item.
pub const NOT_IN_INVENTORY: &str = "(not in inventory)";

/// One recipe ingredient joined against the store's live stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIngredient {
    pub ingredient_name: String,
    /// Quantity required per single yield unit, in the recipe's unit.
    pub quantity_per_unit: Decimal,
    /// Multiplier from the recipe's unit into the stock item's unit.
    pub conversion_factor: Decimal,
    /// Live stock behind the mapping; `None` when the ingredient is unmapped.
    pub stock: Option<StockLevel>,
}

/// The stock side of a resolved ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    pub inventory_item_id: InventoryItemId,
    pub on_hand_quantity: Decimal,
}

impl ResolvedIngredient {
    /// Quantity of the stock item consumed per yield unit.
    #[must_use]
    pub fn required_in_stock_units(&self) -> Decimal {
        self.quantity_per_unit * self.conversion_factor
    }
}

/// Presentation-facing status of a sellable product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Every ingredient is mapped and production is possible.
    ReadyToSell,
    /// The recipe has no ingredients configured at all.
    SetupNeeded,
    /// At least one ingredient has no inventory mapping.
    MissingIngredients,
    /// No recipe behind the product; sells without deduction.
    DirectProduct,
}

/// Producibility report for one recipe, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeAvailability {
    pub status: ProductStatus,
    pub available_ingredients: u32,
    pub total_ingredients: u32,
    /// Names of unmapped ingredients, suffixed with [`NOT_IN_INVENTORY`].
    pub missing_ingredients: Vec<String>,
    /// Maximum sellable units given current stock, bounded by the scarcest
    /// ingredient. Zero whenever any ingredient is missing.
    pub max_production: u64,
}

/// Compute producibility for a resolved ingredient set.
///
/// An ingredient is "available" when on-hand stock covers one yield unit.
/// The producible quantity is the minimum over all ingredients of
/// `floor(on_hand / required)`; any unmapped ingredient pins it to zero.
#[must_use]
pub fn analyze(ingredients: &[ResolvedIngredient]) -> RecipeAvailability {
    if ingredients.is_empty() {
        return RecipeAvailability {
            status: ProductStatus::SetupNeeded,
            available_ingredients: 0,
            total_ingredients: 0,
            missing_ingredients: Vec::new(),
            max_production: 0,
        };
    }

    let total = u32::try_from(ingredients.len()).unwrap_or(u32::MAX);
    let mut available = 0u32;
    let mut missing = Vec::new();
    let mut max_production: Option<u64> = None;

    for ingredient in ingredients {
        let Some(stock) = ingredient.stock else {
            missing.push(format!("{} {NOT_IN_INVENTORY}", ingredient.ingredient_name));
            continue;
        };

        let required = ingredient.required_in_stock_units();
        if required <= Decimal::ZERO {
            // Zero-quantity rows constrain nothing; validation rejects them
            // at import, but old data may still carry them.
            available += 1;
            continue;
        }

        if stock.on_hand_quantity >= required {
            available += 1;
        }

        let producible = (stock.on_hand_quantity / required)
            .floor()
            .to_u64()
            .unwrap_or(0);
        max_production = Some(max_production.map_or(producible, |m| m.min(producible)));
    }

    let (status, max_production) = if missing.is_empty() {
        (ProductStatus::ReadyToSell, max_production.unwrap_or(0))
    } else {
        (ProductStatus::MissingIngredients, 0)
    };

    RecipeAvailability {
        status,
        available_ingredients: available,
        total_ingredients: total,
        missing_ingredients: missing,
        max_production,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(name: &str, per_unit: i64, on_hand: Option<i64>) -> ResolvedIngredient {
        ResolvedIngredient {
            ingredient_name: name.to_string(),
            quantity_per_unit: Decimal::from(per_unit),
            conversion_factor: Decimal::ONE,
            stock: on_hand.map(|q| StockLevel {
                inventory_item_id: InventoryItemId::generate(),
                on_hand_quantity: Decimal::from(q),
            }),
        }
    }

    #[test]
    fn test_empty_recipe_needs_setup() {
        let report = analyze(&[]);
        assert_eq!(report.status, ProductStatus::SetupNeeded);
        assert_eq!(report.max_production, 0);
    }

    #[test]
    fn test_scarcest_ingredient_bounds_production() {
        // Flour: 2/unit with 10 on hand -> 5; Sugar: 1/unit with 3 -> 3.
        let report = analyze(&[
            resolved("Flour", 2, Some(10)),
            resolved("Sugar", 1, Some(3)),
        ]);
        assert_eq!(report.status, ProductStatus::ReadyToSell);
        assert_eq!(report.max_production, 3);
        assert_eq!(report.available_ingredients, 2);
        assert_eq!(report.total_ingredients, 2);
    }

    #[test]
    fn test_unmapped_ingredient_pins_to_zero() {
        let report = analyze(&[
            resolved("Flour", 2, Some(100)),
            resolved("Saffron", 1, None),
        ]);
        assert_eq!(report.status, ProductStatus::MissingIngredients);
        assert_eq!(report.max_production, 0);
        assert_eq!(
            report.missing_ingredients,
            vec!["Saffron (not in inventory)".to_string()]
        );
    }

    #[test]
    fn test_insufficient_but_mapped_is_not_missing() {
        let report = analyze(&[resolved("Flour", 5, Some(3))]);
        assert_eq!(report.status, ProductStatus::ReadyToSell);
        assert_eq!(report.max_production, 0);
        assert_eq!(report.available_ingredients, 0);
        assert!(report.missing_ingredients.is_empty());
    }

    #[test]
    fn test_conversion_factor_scales_requirement() {
        // Recipe needs 500 grams/unit; stock is 2 kg.
        let ingredient = ResolvedIngredient {
            ingredient_name: "Sugar".to_string(),
            quantity_per_unit: Decimal::from(500),
            conversion_factor: Decimal::new(1, 3), // grams -> kg
            stock: Some(StockLevel {
                inventory_item_id: InventoryItemId::generate(),
                on_hand_quantity: Decimal::from(2),
            }),
        };
        let report = analyze(&[ingredient]);
        assert_eq!(report.max_production, 4);
    }

    #[test]
    fn test_fractional_producibility_floors() {
        // 3/unit with 10 on hand -> floor(3.33) = 3.
        let report = analyze(&[resolved("Cream", 3, Some(10))]);
        assert_eq!(report.max_production, 3);
    }
}
