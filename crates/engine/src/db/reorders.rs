//! Replenishment request storage.

use sqlx::PgConnection;
use uuid::Uuid;

use larder_core::ReorderRequest;

use super::RepositoryError;

/// Persist a reorder request and its lines.
///
/// Takes a connection rather than an executor because the header and line
/// inserts must land together; callers run it inside a transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any insert fails.
pub async fn insert_request(
    conn: &mut PgConnection,
    request: &ReorderRequest,
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT INTO reorder_requests (id, store_id, created_at) VALUES ($1, $2, $3)")
        .bind(request.id)
        .bind(request.store_id)
        .bind(request.created_at)
        .execute(&mut *conn)
        .await?;

    for line in &request.lines {
        sqlx::query(
            "INSERT INTO reorder_lines (id, request_id, inventory_item_id, item_name, \
             on_hand_quantity, minimum_threshold, requested_quantity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::new_v4())
        .bind(request.id)
        .bind(line.inventory_item_id)
        .bind(&line.item_name)
        .bind(line.on_hand_quantity)
        .bind(line.minimum_threshold)
        .bind(line.requested_quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
