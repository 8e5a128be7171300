//! Store-scoped physical stock records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{InventoryItemId, StoreId};

/// A physical stock record belonging to exactly one store.
///
/// `on_hand_quantity` is only ever mutated by the deduction engine (sales),
/// manual adjustment flows, and replenishment receipts; every mutation is
/// mirrored by an append-only [`super::StockMovement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub store_id: StoreId,
    /// Canonical item name, the target of ingredient matching.
    pub name: String,
    pub unit: String,
    /// Current stock. Invariant: never negative; deductions clamp at zero.
    pub on_hand_quantity: Decimal,
    /// Reorder trigger point. At or below this, the item is low stock.
    pub minimum_threshold: Decimal,
    /// Storage ceiling used to size replenishment requests, when known.
    pub maximum_capacity: Option<Decimal>,
    pub is_active: bool,
    /// Whether this item may back recipe ingredients. Items stocked in
    /// packaging units ("box", "pack") are excluded from recipe use.
    pub recipe_compatible: bool,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Current stock level relative to the reorder threshold.
    #[must_use]
    pub fn stock_status(&self) -> StockStatus {
        if self.on_hand_quantity <= Decimal::ZERO {
            StockStatus::Out
        } else if self.on_hand_quantity <= self.minimum_threshold {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }

    /// Whether the matcher may offer this item as a mapping target.
    #[must_use]
    pub const fn matchable(&self) -> bool {
        self.is_active && self.recipe_compatible
    }
}

/// Stock level relative to the reorder threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Ok,
    Low,
    Out,
}
