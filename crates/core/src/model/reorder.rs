//! Replenishment requests raised by the reorder trigger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{InventoryItemId, ReorderRequestId, StoreId};

/// One batched replenishment request covering every low-stock item found in
/// a single scan of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub id: ReorderRequestId,
    pub store_id: StoreId,
    pub lines: Vec<ReorderLine>,
    pub created_at: DateTime<Utc>,
}

/// One item within a replenishment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderLine {
    pub inventory_item_id: InventoryItemId,
    pub item_name: String,
    pub on_hand_quantity: Decimal,
    pub minimum_threshold: Decimal,
    /// `maximum_capacity - on_hand`, or the configured default when the item
    /// has no capacity on record.
    pub requested_quantity: Decimal,
}
