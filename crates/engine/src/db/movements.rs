//! The append-only stock movement ledger.
//!
//! Only inserts and reads. No function in this module (or anywhere else)
//! updates or deletes a movement row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgExecutor;
use uuid::Uuid;

use larder_core::{
    InventoryItemId, MovementId, MovementType, StockMovement, TransactionRef,
};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct MovementRow {
    id: MovementId,
    inventory_item_id: InventoryItemId,
    movement_type: String,
    delta: Decimal,
    previous_quantity: Decimal,
    new_quantity: Decimal,
    transaction_ref: Option<String>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = RepositoryError;

    fn try_from(r: MovementRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            inventory_item_id: r.inventory_item_id,
            movement_type: r.movement_type.parse::<MovementType>().map_err(|e| {
                RepositoryError::DataCorruption(format!("movement {}: {e}", r.id))
            })?,
            delta: r.delta,
            previous_quantity: r.previous_quantity,
            new_quantity: r.new_quantity,
            transaction_ref: r.transaction_ref.map(TransactionRef::new),
            note: r.note,
            created_at: r.created_at,
        })
    }
}

const MOVEMENT_COLUMNS: &str = "id, inventory_item_id, movement_type, delta, \
     previous_quantity, new_quantity, transaction_ref, note, created_at";

/// Append one movement to the ledger.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails (including the
/// ledger invariant check `new_quantity = previous_quantity + delta`).
pub async fn insert(
    exec: impl PgExecutor<'_>,
    movement: &StockMovement,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO stock_movements (id, inventory_item_id, movement_type, delta, \
         previous_quantity, new_quantity, transaction_ref, note, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(movement.id)
    .bind(movement.inventory_item_id)
    .bind(movement.movement_type.as_str())
    .bind(movement.delta)
    .bind(movement.previous_quantity)
    .bind(movement.new_quantity)
    .bind(movement.transaction_ref.as_ref().map(TransactionRef::as_str))
    .bind(&movement.note)
    .bind(movement.created_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Whether a sale movement for this transaction already touched any of the
/// given items.
///
/// The deduction engine's idempotency check. Scoped to the recipe's own
/// inventory items: one sale carries one transaction reference across all
/// its line items, so an unscoped check would mistake another line item's
/// movements for a replay of this one.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn sale_exists_for_items(
    exec: impl PgExecutor<'_>,
    transaction_ref: &TransactionRef,
    item_ids: &[InventoryItemId],
) -> Result<bool, RepositoryError> {
    let ids: Vec<Uuid> = item_ids.iter().copied().map(Uuid::from).collect();
    let exists: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM stock_movements \
         WHERE transaction_ref = $1 AND movement_type = 'sale' \
         AND inventory_item_id = ANY($2))",
    )
    .bind(transaction_ref.as_str())
    .bind(ids)
    .fetch_one(exec)
    .await?;
    Ok(exists.0)
}

/// All movements written for one transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_by_transaction(
    exec: impl PgExecutor<'_>,
    transaction_ref: &TransactionRef,
) -> Result<Vec<StockMovement>, RepositoryError> {
    let rows = sqlx::query_as::<_, MovementRow>(&format!(
        "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
         WHERE transaction_ref = $1 ORDER BY created_at"
    ))
    .bind(transaction_ref.as_str())
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(StockMovement::try_from).collect()
}

/// Movement history of one inventory item, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_by_item(
    exec: impl PgExecutor<'_>,
    inventory_item_id: InventoryItemId,
) -> Result<Vec<StockMovement>, RepositoryError> {
    let rows = sqlx::query_as::<_, MovementRow>(&format!(
        "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
         WHERE inventory_item_id = $1 ORDER BY created_at DESC"
    ))
    .bind(inventory_item_id)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(StockMovement::try_from).collect()
}

/// Movements in a date range, for reconciliation sweeps.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_between(
    exec: impl PgExecutor<'_>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<StockMovement>, RepositoryError> {
    let rows = sqlx::query_as::<_, MovementRow>(&format!(
        "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
         WHERE created_at >= $1 AND created_at < $2 ORDER BY created_at"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(StockMovement::try_from).collect()
}
