//! Append-only stock movement audit records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::types::{InventoryItemId, MovementId, TransactionRef};

/// One immutable entry in the stock ledger.
///
/// Movements are never mutated or deleted; they are the record of truth for
/// reconciliation. Invariant: `new_quantity == previous_quantity + delta`
/// and equals the inventory item's quantity immediately after the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub inventory_item_id: InventoryItemId,
    pub movement_type: MovementType,
    /// Signed change; negative for sales.
    pub delta: Decimal,
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
    /// Originating transaction, when the movement came from a sale.
    pub transaction_ref: Option<TransactionRef>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Why an inventory quantity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Deduction driven by a completed sale.
    Sale,
    /// Manual correction by store staff.
    Adjustment,
    /// Replenishment receipt.
    Receipt,
}

impl MovementType {
    /// Database/text representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Adjustment => "adjustment",
            Self::Receipt => "receipt",
        }
    }
}

/// Error for unrecognized movement type strings.
#[derive(Debug, Error)]
#[error("unknown movement type: {0}")]
pub struct ParseMovementTypeError(String);

impl FromStr for MovementType {
    type Err = ParseMovementTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "adjustment" => Ok(Self::Adjustment),
            "receipt" => Ok(Self::Receipt),
            other => Err(ParseMovementTypeError(other.to_string())),
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_type_roundtrip() {
        for ty in [
            MovementType::Sale,
            MovementType::Adjustment,
            MovementType::Receipt,
        ] {
            assert_eq!(ty.as_str().parse::<MovementType>().ok(), Some(ty));
        }
    }

    #[test]
    fn test_movement_type_rejects_unknown() {
        assert!("transfer".parse::<MovementType>().is_err());
    }
}
