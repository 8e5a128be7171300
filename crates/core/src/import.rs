//! Template import: row grouping and definition validation.
//!
//! The import pipeline (CSV/JSON parsing, upload forms) is external; it
//! hands this module flat, already-structured rows. Grouping by recipe name
//! preserves first-seen order so bulk imports deploy in authored order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{IngredientDefinition, TemplateDefinition};

/// One structured row from the external import pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    pub recipe_name: String,
    pub category: String,
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub cost_per_unit: Decimal,
    #[serde(default)]
    pub ingredient_category: Option<String>,
    /// Optional; defaults to 1 when the pipeline omits it.
    #[serde(default)]
    pub yield_quantity: Option<Decimal>,
    #[serde(default)]
    pub serving_size: Option<Decimal>,
    #[serde(default)]
    pub suggested_price: Option<Decimal>,
}

/// Group flat rows into one [`TemplateDefinition`] per distinct recipe name.
///
/// Rows sharing a `recipe_name` merge into one definition with N ingredient
/// lines, in row order. The first row of a group supplies the header fields
/// (category, yields, price); later rows only contribute ingredients.
#[must_use]
pub fn group_rows(rows: Vec<TemplateRow>) -> Vec<TemplateDefinition> {
    let mut order: Vec<TemplateDefinition> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let ingredient = IngredientDefinition {
            ingredient_name: row.ingredient_name,
            quantity: row.quantity,
            unit: row.unit,
            cost_per_unit: row.cost_per_unit,
            category: row.ingredient_category,
        };

        if let Some(&i) = index.get(&row.recipe_name) {
            if let Some(def) = order.get_mut(i) {
                def.ingredients.push(ingredient);
            }
        } else {
            index.insert(row.recipe_name.clone(), order.len());
            order.push(TemplateDefinition {
                name: row.recipe_name,
                category: row.category,
                yield_quantity: row.yield_quantity.unwrap_or(Decimal::ONE),
                serving_size: row.serving_size.unwrap_or(Decimal::ONE),
                suggested_price: row.suggested_price,
                ingredients: vec![ingredient],
            });
        }
    }

    order
}

/// A single problem found while validating a template definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum ValidationIssue {
    EmptyName,
    NonPositiveYield,
    NoIngredients,
    /// Ingredient with `quantity <= 0`; carries the ingredient name.
    NonPositiveQuantity(String),
    /// Ingredient with an empty unit; carries the ingredient name.
    EmptyUnit(String),
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "template name must not be empty"),
            Self::NonPositiveYield => write!(f, "yield quantity must be greater than zero"),
            Self::NoIngredients => write!(f, "template must have at least one ingredient"),
            Self::NonPositiveQuantity(name) => {
                write!(f, "ingredient \"{name}\" must have quantity greater than zero")
            }
            Self::EmptyUnit(name) => write!(f, "ingredient \"{name}\" must have a unit"),
        }
    }
}

/// Check a definition against the registry's invariants.
///
/// Collects every issue rather than stopping at the first, so bulk imports
/// can report all problems with a row group in one pass. An empty result
/// means the definition is acceptable.
#[must_use]
pub fn validate_definition(definition: &TemplateDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if definition.name.trim().is_empty() {
        issues.push(ValidationIssue::EmptyName);
    }
    if definition.yield_quantity <= Decimal::ZERO {
        issues.push(ValidationIssue::NonPositiveYield);
    }
    if definition.ingredients.is_empty() {
        issues.push(ValidationIssue::NoIngredients);
    }
    for ingredient in &definition.ingredients {
        if ingredient.quantity <= Decimal::ZERO {
            issues.push(ValidationIssue::NonPositiveQuantity(
                ingredient.ingredient_name.clone(),
            ));
        }
        if ingredient.unit.trim().is_empty() {
            issues.push(ValidationIssue::EmptyUnit(
                ingredient.ingredient_name.clone(),
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(recipe: &str, ingredient: &str, qty: i64) -> TemplateRow {
        TemplateRow {
            recipe_name: recipe.to_string(),
            category: "Pastries".to_string(),
            ingredient_name: ingredient.to_string(),
            quantity: Decimal::from(qty),
            unit: "pieces".to_string(),
            cost_per_unit: Decimal::from(5),
            ingredient_category: None,
            yield_quantity: None,
            serving_size: None,
            suggested_price: None,
        }
    }

    #[test]
    fn test_group_rows_by_recipe_name() {
        let defs = group_rows(vec![
            row("Croffle", "Croissant", 1),
            row("Croffle", "Whipped Cream", 2),
            row("Latte", "Milk", 150),
        ]);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "Croffle");
        assert_eq!(defs[0].ingredients.len(), 2);
        assert_eq!(defs[1].name, "Latte");
        assert_eq!(defs[1].ingredients.len(), 1);
    }

    #[test]
    fn test_group_rows_preserves_first_seen_order() {
        let defs = group_rows(vec![
            row("B", "x", 1),
            row("A", "y", 1),
            row("B", "z", 1),
        ]);
        assert_eq!(
            defs.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            vec!["B", "A"]
        );
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let defs = group_rows(vec![row("Croffle", "Croissant", 1)]);
        assert!(validate_definition(&defs[0]).is_empty());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let mut def = group_rows(vec![row("", "Croissant", 0)]).remove(0);
        def.yield_quantity = Decimal::ZERO;
        def.ingredients[0].unit = " ".to_string();
        let issues = validate_definition(&def);
        assert!(issues.contains(&ValidationIssue::EmptyName));
        assert!(issues.contains(&ValidationIssue::NonPositiveYield));
        assert!(issues.contains(&ValidationIssue::NonPositiveQuantity(
            "Croissant".to_string()
        )));
        assert!(issues.contains(&ValidationIssue::EmptyUnit("Croissant".to_string())));
    }

    #[test]
    fn test_validate_rejects_no_ingredients() {
        let def = TemplateDefinition {
            name: "Ghost".to_string(),
            category: "Drinks".to_string(),
            yield_quantity: Decimal::ONE,
            serving_size: Decimal::ONE,
            suggested_price: None,
            ingredients: Vec::new(),
        };
        assert_eq!(
            validate_definition(&def),
            vec![ValidationIssue::NoIngredients]
        );
    }
}
