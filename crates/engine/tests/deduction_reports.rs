//! Tests for deduction report shapes and error surfaces.
//!
//! These verify the contract the POS integration consumes, without
//! requiring a database.

use rust_decimal::Decimal;
use serde_json::json;

use larder_core::deduction::Shortfall;
use larder_core::{InventoryItemId, TransactionRef};
use larder_engine::services::deduction::{
    DeductedLine, DeductionError, DeductionOutcome, DeductionReport,
};

// =============================================================================
// Report Serialization Tests
// =============================================================================

#[test]
fn test_applied_report_serializes_flat() {
    let report = DeductionReport {
        transaction_ref: TransactionRef::new("pos-1001"),
        outcome: DeductionOutcome::Applied {
            deducted: vec![DeductedLine {
                inventory_item_id: InventoryItemId::generate(),
                ingredient_name: "Whole Milk".to_string(),
                requested: Decimal::from(240),
                applied: Decimal::from(240),
                new_quantity: Decimal::from(3760),
            }],
        },
        duration_ms: 12,
    };

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["transaction_ref"], json!("pos-1001"));
    assert_eq!(value["outcome"], json!("applied"));
    assert_eq!(value["deducted"][0]["ingredient_name"], json!("Whole Milk"));
    assert_eq!(value["duration_ms"], json!(12));
}

#[test]
fn test_direct_product_report_has_no_lines() {
    let report = DeductionReport {
        transaction_ref: TransactionRef::new("pos-1002"),
        outcome: DeductionOutcome::DirectProduct,
        duration_ms: 3,
    };

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["outcome"], json!("direct_product"));
    assert!(value.get("deducted").is_none());
}

#[test]
fn test_already_applied_report_roundtrips() {
    let report = DeductionReport {
        transaction_ref: TransactionRef::new("pos-1003"),
        outcome: DeductionOutcome::AlreadyApplied,
        duration_ms: 1,
    };

    let raw = serde_json::to_string(&report).unwrap();
    let back: DeductionReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, report);
}

// =============================================================================
// Error Surface Tests
// =============================================================================

#[test]
fn test_insufficient_stock_lists_every_shortfall() {
    let error = DeductionError::InsufficientStock {
        shortfalls: vec![
            Shortfall {
                ingredient_name: "Whole Milk".to_string(),
                required: Decimal::from(120),
                available: Decimal::from(100),
            },
            Shortfall {
                ingredient_name: "Espresso Beans".to_string(),
                required: Decimal::from(36),
                available: Decimal::from(10),
            },
        ],
    };

    let message = error.to_string();
    assert!(message.contains("2 ingredient(s)"));

    // The shortfalls themselves carry the operator-facing detail.
    let DeductionError::InsufficientStock { shortfalls } = error else {
        panic!("wrong variant");
    };
    assert_eq!(
        shortfalls[0].to_string(),
        "Whole Milk: need 120, have 100"
    );
}

#[test]
fn test_shortfall_display_includes_quantities() {
    let shortfall = Shortfall {
        ingredient_name: "Butter".to_string(),
        required: Decimal::new(255, 1),
        available: Decimal::ZERO,
    };
    assert_eq!(shortfall.to_string(), "Butter: need 25.5, have 0");
}
