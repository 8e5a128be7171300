//! Inventory seeding from a JSON file.
//!
//! Input is a JSON array of items:
//!
//! ```json
//! [
//!   {
//!     "name": "Whole Milk",
//!     "unit": "ml",
//!     "on_hand_quantity": "4000",
//!     "minimum_threshold": "500",
//!     "maximum_capacity": "6000"
//!   }
//! ]
//! ```

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use larder_core::{InventoryItem, InventoryItemId, StoreId};
use larder_engine::db::inventory;

#[derive(Deserialize)]
struct SeedItem {
    name: String,
    unit: String,
    on_hand_quantity: Decimal,
    minimum_threshold: Decimal,
    #[serde(default)]
    maximum_capacity: Option<Decimal>,
    #[serde(default = "default_true")]
    recipe_compatible: bool,
}

const fn default_true() -> bool {
    true
}

/// Insert the items in `file` into the store's inventory.
///
/// Items whose name is already stocked are skipped with a warning; the
/// rest of the file still loads.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a non-conflict insert
/// failure occurs.
pub async fn inventory(store_id: StoreId, file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(file)?;
    let items: Vec<SeedItem> = serde_json::from_str(&raw)?;

    let (_, pool) = super::connect().await?;

    let mut inserted = 0usize;
    for seed in items {
        let item = InventoryItem {
            id: InventoryItemId::generate(),
            store_id,
            name: seed.name,
            unit: seed.unit,
            on_hand_quantity: seed.on_hand_quantity,
            minimum_threshold: seed.minimum_threshold,
            maximum_capacity: seed.maximum_capacity,
            is_active: true,
            recipe_compatible: seed.recipe_compatible,
            updated_at: Utc::now(),
        };
        match inventory::insert(&pool, &item).await {
            Ok(()) => inserted += 1,
            Err(larder_engine::db::RepositoryError::Conflict(msg)) => {
                tracing::warn!("Skipping: {msg}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(inserted, %store_id, "Inventory seeded");
    Ok(())
}
