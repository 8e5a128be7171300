//! Store-independent recipe template definitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{TemplateId, TemplateIngredientId};

/// A versioned, store-independent definition of a product's composition.
///
/// Templates are created by import and updated by version bump. They are
/// never hard-deleted; deactivation flips `is_active` so that historical
/// per-store recipes keep a valid provenance reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeTemplate {
    pub id: TemplateId,
    pub name: String,
    /// Organizational label, projected into each store's category list at
    /// deployment time.
    pub category: String,
    pub yield_quantity: Decimal,
    pub serving_size: Decimal,
    pub suggested_price: Decimal,
    /// Sum of `quantity * cost_per_unit` over the template's ingredients.
    pub total_cost: Decimal,
    pub is_active: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ingredient row of a template, as authored.
///
/// `ingredient_name` is free text; it is resolved to a concrete inventory
/// item per store by the matcher, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateIngredient {
    pub id: TemplateIngredientId,
    pub template_id: TemplateId,
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Decimal,
    pub category: Option<String>,
}

/// Input shape for creating a template, before any IDs exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub name: String,
    pub category: String,
    pub yield_quantity: Decimal,
    pub serving_size: Decimal,
    /// Authored price; when absent the registry derives one from cost.
    pub suggested_price: Option<Decimal>,
    pub ingredients: Vec<IngredientDefinition>,
}

impl TemplateDefinition {
    /// Total ingredient cost for one yield of this definition.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.ingredients
            .iter()
            .map(|i| i.quantity * i.cost_per_unit)
            .sum()
    }
}

/// One authored ingredient line of a [`TemplateDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDefinition {
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Decimal,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cost_sums_lines() {
        let def = TemplateDefinition {
            name: "Croissant Overload".to_string(),
            category: "Pastries".to_string(),
            yield_quantity: Decimal::ONE,
            serving_size: Decimal::ONE,
            suggested_price: None,
            ingredients: vec![
                IngredientDefinition {
                    ingredient_name: "Regular Croissant".to_string(),
                    quantity: Decimal::from(1),
                    unit: "pieces".to_string(),
                    cost_per_unit: Decimal::from(30),
                    category: None,
                },
                IngredientDefinition {
                    ingredient_name: "Whipped Cream".to_string(),
                    quantity: Decimal::from(2),
                    unit: "pieces".to_string(),
                    cost_per_unit: Decimal::from(5),
                    category: None,
                },
            ],
        };
        assert_eq!(def.total_cost(), Decimal::from(40));
    }
}
