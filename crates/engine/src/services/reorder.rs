//! Threshold-driven replenishment requests.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, instrument};

use larder_core::{ReorderLine, ReorderRequest, ReorderRequestId, StoreId};

use crate::db::{RepositoryError, inventory, reorders};

/// Scans a store's stock and files reorder requests for depleted items.
pub struct ReorderTrigger {
    pool: PgPool,
    default_quantity: Decimal,
}

impl ReorderTrigger {
    /// Create a trigger with the configured fallback request quantity,
    /// used for items with no recorded maximum capacity.
    #[must_use]
    pub const fn new(pool: PgPool, default_quantity: Decimal) -> Self {
        Self {
            pool,
            default_quantity,
        }
    }

    /// File one reorder request covering every active item at or below its
    /// threshold, or nothing when stock is healthy.
    ///
    /// Requested quantity is top-up to capacity when a capacity is known
    /// and above the current level, else the configured default. The
    /// request is advisory; it never mutates stock levels.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the scan or insert fails.
    #[instrument(skip(self))]
    pub async fn check_reorder(
        &self,
        store_id: StoreId,
    ) -> Result<Option<ReorderRequest>, RepositoryError> {
        let depleted = inventory::list_at_or_below_threshold(&self.pool, store_id).await?;
        if depleted.is_empty() {
            return Ok(None);
        }

        let lines = depleted
            .into_iter()
            .map(|item| {
                let requested_quantity = match item.maximum_capacity {
                    Some(capacity) if capacity > item.on_hand_quantity => {
                        capacity - item.on_hand_quantity
                    }
                    _ => self.default_quantity,
                };
                ReorderLine {
                    inventory_item_id: item.id,
                    item_name: item.name,
                    on_hand_quantity: item.on_hand_quantity,
                    minimum_threshold: item.minimum_threshold,
                    requested_quantity,
                }
            })
            .collect::<Vec<_>>();

        let request = ReorderRequest {
            id: ReorderRequestId::generate(),
            store_id,
            lines,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;
        reorders::insert_request(&mut tx, &request).await?;
        tx.commit().await?;

        info!(
            %store_id,
            request = %request.id,
            lines = request.lines.len(),
            "Filed reorder request"
        );
        Ok(Some(request))
    }
}
