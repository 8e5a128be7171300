//! Dry-run planning for sale-time stock deduction.
//!
//! The validation phase of the deduction engine is pure: given the resolved
//! ingredient set and the quantity sold, either produce a complete plan or
//! enumerate every shortfall. All-or-nothing at this boundary - a
//! half-deducted sale would leave a ledger matching no real transaction.
//!
//! The numbers computed here are advisory; the engine's commit phase
//! re-checks against the persisted quantity under a row lock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::availability::{NOT_IN_INVENTORY, ResolvedIngredient};
use crate::types::InventoryItemId;

/// One ingredient decrement the commit phase should apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedDeduction {
    pub inventory_item_id: InventoryItemId,
    pub ingredient_name: String,
    /// Total quantity to remove, in the stock item's unit.
    pub required_quantity: Decimal,
}

/// An ingredient that cannot cover the sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub ingredient_name: String,
    pub required: Decimal,
    pub available: Decimal,
}

impl std::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: need {}, have {}",
            self.ingredient_name, self.required, self.available
        )
    }
}

/// Validate a sale against current stock and plan the decrements.
///
/// `required = quantity_per_unit * quantity_sold`, converted into each stock
/// item's unit. Collects every short or unmapped ingredient before deciding;
/// if any exist the whole call fails with the full list and nothing is
/// planned for the sufficient ingredients either.
///
/// # Errors
///
/// Returns the complete list of [`Shortfall`]s when any ingredient cannot
/// cover the sale. Unmapped ingredients are reported as shortfalls with zero
/// availability.
pub fn plan_deduction(
    ingredients: &[ResolvedIngredient],
    quantity_sold: u32,
) -> Result<Vec<PlannedDeduction>, Vec<Shortfall>> {
    let sold = Decimal::from(quantity_sold);
    let mut plan = Vec::with_capacity(ingredients.len());
    let mut shortfalls = Vec::new();

    for ingredient in ingredients {
        let required = ingredient.required_in_stock_units() * sold;

        match ingredient.stock {
            None => shortfalls.push(Shortfall {
                ingredient_name: format!("{} {NOT_IN_INVENTORY}", ingredient.ingredient_name),
                required,
                available: Decimal::ZERO,
            }),
            Some(stock) if stock.on_hand_quantity < required => shortfalls.push(Shortfall {
                ingredient_name: ingredient.ingredient_name.clone(),
                required,
                available: stock.on_hand_quantity,
            }),
            Some(stock) => plan.push(PlannedDeduction {
                inventory_item_id: stock.inventory_item_id,
                ingredient_name: ingredient.ingredient_name.clone(),
                required_quantity: required,
            }),
        }
    }

    if shortfalls.is_empty() {
        Ok(plan)
    } else {
        Err(shortfalls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::StockLevel;

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
    fn test_sufficient_stock_plans_all_lines() {
        // Croissant = 50, Cream = 50, 1 each per serving, sale of 1.
        let plan = plan_deduction(
            &[resolved("Croissant", 1, Some(50)), resolved("Cream", 1, Some(50))],
            1,
        )
        .expect("plan");
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|l| l.required_quantity == Decimal::ONE));
    }

    #[test]
    fn test_shortfall_reports_need_and_have() {
        // Milk = 100, 2 units/serving, sale of 60 -> need 120 > 100.
        let err = plan_deduction(&[resolved("Milk", 2, Some(100))], 60)
            .expect_err("should be short");
        assert_eq!(err.len(), 1);
        let shortfall = err.first().expect("one shortfall");
        assert_eq!(shortfall.to_string(), "Milk: need 120, have 100");
    }

    #[test]
    fn test_any_shortfall_fails_whole_plan() {
        // Sugar is plentiful, Milk is short: nothing may be planned.
        let err = plan_deduction(
            &[resolved("Sugar", 1, Some(1000)), resolved("Milk", 2, Some(3))],
            5,
        )
        .expect_err("short on milk");
        assert_eq!(err.len(), 1);
        assert_eq!(err.first().map(|s| s.ingredient_name.as_str()), Some("Milk"));
    }

    #[test]
    fn test_all_shortfalls_enumerated() {
        let err = plan_deduction(
            &[resolved("Milk", 10, Some(5)), resolved("Flour", 10, Some(2))],
            1,
        )
        .expect_err("both short");
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn test_unmapped_ingredient_is_shortfall_with_zero() {
        let err = plan_deduction(&[resolved("Saffron", 1, None)], 1).expect_err("unmapped");
        let shortfall = err.first().expect("one shortfall");
        assert_eq!(shortfall.available, Decimal::ZERO);
        assert!(shortfall.ingredient_name.contains("(not in inventory)"));
    }

    #[test]
    fn test_conversion_factor_in_required() {
        // 200 grams per serving, stock kept in kg: 3 servings -> 0.6 kg.
        let ingredient = ResolvedIngredient {
            ingredient_name: "Sugar".to_string(),
            quantity_per_unit: Decimal::from(200),
            conversion_factor: Decimal::new(1, 3),
            stock: Some(StockLevel {
                inventory_item_id: InventoryItemId::generate(),
                on_hand_quantity: Decimal::ONE,
            }),
        };
        let plan = plan_deduction(&[ingredient], 3).expect("plan");
        assert_eq!(
            plan.first().map(|l| l.required_quantity),
            Some(Decimal::new(6, 1))
        );
    }

    #[test]
    fn test_exact_boundary_is_sufficient() {
        let plan = plan_deduction(&[resolved("Milk", 2, Some(100))], 50).expect("plan");
        assert_eq!(
            plan.first().map(|l| l.required_quantity),
            Some(Decimal::from(100))
        );
    }
}
