//! Inventory item queries and the atomic sale-time decrement.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgExecutor;

use larder_core::{InventoryItem, InventoryItemId, StoreId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: InventoryItemId,
    store_id: StoreId,
    name: String,
    unit: String,
    on_hand_quantity: Decimal,
    minimum_threshold: Decimal,
    maximum_capacity: Option<Decimal>,
    is_active: bool,
    recipe_compatible: bool,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for InventoryItem {
    fn from(r: ItemRow) -> Self {
        Self {
            id: r.id,
            store_id: r.store_id,
            name: r.name,
            unit: r.unit,
            on_hand_quantity: r.on_hand_quantity,
            minimum_threshold: r.minimum_threshold,
            maximum_capacity: r.maximum_capacity,
            is_active: r.is_active,
            recipe_compatible: r.recipe_compatible,
            updated_at: r.updated_at,
        }
    }
}

const ITEM_COLUMNS: &str = "id, store_id, name, unit, on_hand_quantity, minimum_threshold, \
     maximum_capacity, is_active, recipe_compatible, updated_at";

/// Insert a stock record. Used by seeding and replenishment tooling; the
/// engine itself never creates inventory.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the store already stocks an item
/// with this name.
pub async fn insert(
    exec: impl PgExecutor<'_>,
    item: &InventoryItem,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO inventory_items (id, store_id, name, unit, on_hand_quantity, \
         minimum_threshold, maximum_capacity, is_active, recipe_compatible, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(item.id)
    .bind(item.store_id)
    .bind(&item.name)
    .bind(&item.unit)
    .bind(item.on_hand_quantity)
    .bind(item.minimum_threshold)
    .bind(item.maximum_capacity)
    .bind(item.is_active)
    .bind(item.recipe_compatible)
    .bind(item.updated_at)
    .execute(exec)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(format!("item already stocked: {}", item.name))
        }
        _ => RepositoryError::Database(e),
    })?;
    Ok(())
}

/// Look up one item.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get(
    exec: impl PgExecutor<'_>,
    id: InventoryItemId,
) -> Result<Option<InventoryItem>, RepositoryError> {
    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(row.map(InventoryItem::from))
}

/// Active, recipe-compatible items for a store: the matcher's search space.
///
/// Ordered by name so matching is deterministic for a given stock state.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_matchable(
    exec: impl PgExecutor<'_>,
    store_id: StoreId,
) -> Result<Vec<InventoryItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_items \
         WHERE store_id = $1 AND is_active AND recipe_compatible \
         ORDER BY name"
    ))
    .bind(store_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(InventoryItem::from).collect())
}

/// All active items for a store.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_active(
    exec: impl PgExecutor<'_>,
    store_id: StoreId,
) -> Result<Vec<InventoryItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_items \
         WHERE store_id = $1 AND is_active ORDER BY name"
    ))
    .bind(store_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(InventoryItem::from).collect())
}

/// Active items at or below their reorder threshold.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_at_or_below_threshold(
    exec: impl PgExecutor<'_>,
    store_id: StoreId,
) -> Result<Vec<InventoryItem>, RepositoryError> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_items \
         WHERE store_id = $1 AND is_active AND on_hand_quantity <= minimum_threshold \
         ORDER BY name"
    ))
    .bind(store_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(InventoryItem::from).collect())
}

/// Before/after quantities of one applied decrement.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct AppliedDecrement {
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
}

/// Atomically decrement an item's stock with a floor-at-zero guard.
///
/// The read-modify-write happens against the persisted quantity under a row
/// lock, so two concurrent sales cannot both decrement from the same stale
/// value. Validation reads are advisory; this is the authoritative check.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the item does not exist, and
/// `RepositoryError::Database` if the update fails.
pub async fn atomic_deduct(
    exec: impl PgExecutor<'_>,
    id: InventoryItemId,
    amount: Decimal,
) -> Result<AppliedDecrement, RepositoryError> {
    let applied = sqlx::query_as::<_, AppliedDecrement>(
        "UPDATE inventory_items i \
         SET on_hand_quantity = GREATEST(i.on_hand_quantity - $2, 0), updated_at = NOW() \
         FROM (SELECT id, on_hand_quantity AS previous_quantity \
               FROM inventory_items WHERE id = $1 FOR UPDATE) prev \
         WHERE i.id = prev.id \
         RETURNING prev.previous_quantity, i.on_hand_quantity AS new_quantity",
    )
    .bind(id)
    .bind(amount)
    .fetch_optional(exec)
    .await?
    .ok_or(RepositoryError::NotFound)?;
    Ok(applied)
}
