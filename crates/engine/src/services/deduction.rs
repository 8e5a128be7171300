//! Deduction engine: sale-time stock commitment.
//!
//! The engine resolves a sold catalog entry to its recipe, validates stock
//! for the full sale, then applies every decrement and its ledger entry in
//! one transaction. A sale either deducts completely or not at all.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use larder_core::deduction::{Shortfall, plan_deduction};
use larder_core::{
    CatalogEntryId, DeductionAudit, InventoryItemId, MovementId, MovementType, StockMovement,
    SyncStatus, TransactionRef,
};

use crate::db::{RepositoryError, audit, inventory, movements, recipes};
use crate::services::ReorderTrigger;

/// Errors from sale deduction.
#[derive(Debug, Error)]
pub enum DeductionError {
    #[error("catalog entry {0} not found")]
    ProductNotFound(CatalogEntryId),

    /// The entry references a recipe with no ingredient rows at all.
    #[error("recipe for catalog entry {0} has no ingredients; deployment incomplete")]
    SetupRequired(CatalogEntryId),

    /// Stock cannot cover the sale. Nothing was deducted.
    #[error("insufficient stock for {} ingredient(s)", shortfalls.len())]
    InsufficientStock { shortfalls: Vec<Shortfall> },

    /// The commit transaction failed partway; it was rolled back and no
    /// deduction was applied.
    #[error("deduction aborted after {processed} of {total} items: {source}")]
    Persistence {
        processed: usize,
        total: usize,
        source: RepositoryError,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One applied decrement within a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductedLine {
    pub inventory_item_id: InventoryItemId,
    pub ingredient_name: String,
    /// Quantity the recipe called for, in the item's stock unit.
    pub requested: Decimal,
    /// Quantity actually removed. Smaller than `requested` only when the
    /// floor-at-zero guard clamped a concurrent race.
    pub applied: Decimal,
    pub new_quantity: Decimal,
}

/// What a deduction call did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DeductionOutcome {
    /// Stock was decremented and ledgered for this sale.
    Applied { deducted: Vec<DeductedLine> },
    /// The entry is a direct product with no recipe; no stock is tracked.
    DirectProduct,
    /// A sale movement for this transaction already exists; nothing was
    /// written.
    AlreadyApplied,
}

/// Report returned to the caller for one sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionReport {
    pub transaction_ref: TransactionRef,
    #[serde(flatten)]
    pub outcome: DeductionOutcome,
    pub duration_ms: i64,
}

/// Applies recipe-driven stock deductions for completed sales.
pub struct DeductionEngine {
    pool: PgPool,
    reorder: Option<ReorderTrigger>,
}

impl DeductionEngine {
    /// Create an engine with no replenishment follow-up.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            reorder: None,
        }
    }

    /// Attach a reorder trigger to run after each successful deduction.
    ///
    /// The follow-up is advisory; its failure never fails the sale.
    #[must_use]
    pub fn with_reorder_trigger(mut self, trigger: ReorderTrigger) -> Self {
        self.reorder = Some(trigger);
        self
    }

    /// Deduct stock for a completed sale of one catalog entry.
    ///
    /// Validation is all-or-nothing: if any ingredient cannot cover the
    /// full sale quantity, no stock changes and every shortfall is
    /// reported. Repeated calls with the same `transaction_ref` are
    /// idempotent. A `quantity_sold` of zero succeeds without touching
    /// stock. Every resolved call, success or failure, leaves a deduction
    /// audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DeductionError::InsufficientStock` when stock cannot cover
    /// the sale, `DeductionError::Persistence` when the commit transaction
    /// fails, and `ProductNotFound` / `SetupRequired` for unresolvable
    /// entries.
    #[instrument(skip(self), fields(txn = %transaction_ref))]
    pub async fn record_sale(
        &self,
        catalog_entry_id: CatalogEntryId,
        quantity_sold: u32,
        transaction_ref: TransactionRef,
    ) -> Result<DeductionReport, DeductionError> {
        let started = std::time::Instant::now();

        let Some(entry) = recipes::get_catalog_entry(&self.pool, catalog_entry_id).await? else {
            let error = DeductionError::ProductNotFound(catalog_entry_id);
            self.record_failure(&transaction_ref, 0, &error, started)
                .await;
            return Err(error);
        };

        let Some(recipe_id) = entry.recipe_id else {
            info!(entry = %entry.name, "Direct product sale, no deduction");
            self.record_success(&transaction_ref, 0, started).await;
            return Ok(Self::report(
                transaction_ref,
                DeductionOutcome::DirectProduct,
                started,
            ));
        };

        let resolved = recipes::list_resolved_ingredients(&self.pool, recipe_id).await?;
        if resolved.is_empty() {
            let error = DeductionError::SetupRequired(catalog_entry_id);
            self.record_failure(&transaction_ref, 0, &error, started)
                .await;
            return Err(error);
        }

        // Idempotency is scoped to this recipe's items. A multi-line sale
        // reuses one transaction reference, so another line item's movements
        // must not read as a replay of this one.
        let item_ids: Vec<InventoryItemId> = resolved
            .iter()
            .filter_map(|r| r.stock.as_ref().map(|s| s.inventory_item_id))
            .collect();
        if movements::sale_exists_for_items(&self.pool, &transaction_ref, &item_ids).await? {
            info!(entry = %entry.name, "Sale already applied for this transaction");
            return Ok(Self::report(
                transaction_ref,
                DeductionOutcome::AlreadyApplied,
                started,
            ));
        }

        if quantity_sold == 0 {
            self.record_success(&transaction_ref, 0, started).await;
            return Ok(Self::report(
                transaction_ref,
                DeductionOutcome::Applied {
                    deducted: Vec::new(),
                },
                started,
            ));
        }

        let plan = match plan_deduction(&resolved, quantity_sold) {
            Ok(plan) => plan,
            Err(shortfalls) => {
                warn!(
                    entry = %entry.name,
                    shortfalls = shortfalls.len(),
                    "Insufficient stock, sale rejected"
                );
                let error = DeductionError::InsufficientStock { shortfalls };
                self.record_failure(&transaction_ref, 0, &error, started)
                    .await;
                return Err(error);
            }
        };

        let total = plan.len();
        let mut deducted = Vec::with_capacity(total);
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        for (processed, line) in plan.iter().enumerate() {
            let step = async {
                let applied =
                    inventory::atomic_deduct(&mut *tx, line.inventory_item_id, line.required_quantity)
                        .await?;
                // The ledger invariant holds even when the guard clamped:
                // delta is the change that actually happened.
                let delta = applied.new_quantity - applied.previous_quantity;
                let clamped = -delta != line.required_quantity;
                let movement = StockMovement {
                    id: MovementId::generate(),
                    inventory_item_id: line.inventory_item_id,
                    movement_type: MovementType::Sale,
                    delta,
                    previous_quantity: applied.previous_quantity,
                    new_quantity: applied.new_quantity,
                    transaction_ref: Some(transaction_ref.clone()),
                    note: clamped.then(|| {
                        format!(
                            "clamped at zero; sale required {}",
                            line.required_quantity
                        )
                    }),
                    created_at: Utc::now(),
                };
                movements::insert(&mut *tx, &movement).await?;
                Ok::<_, RepositoryError>(applied)
            };
            match step.await {
                Ok(applied) => deducted.push(DeductedLine {
                    inventory_item_id: line.inventory_item_id,
                    ingredient_name: line.ingredient_name.clone(),
                    requested: line.required_quantity,
                    applied: applied.previous_quantity - applied.new_quantity,
                    new_quantity: applied.new_quantity,
                }),
                Err(source) => {
                    drop(tx);
                    let error = DeductionError::Persistence {
                        processed,
                        total,
                        source,
                    };
                    self.record_failure(&transaction_ref, processed, &error, started)
                        .await;
                    return Err(error);
                }
            }
        }
        tx.commit().await.map_err(RepositoryError::from)?;

        info!(
            entry = %entry.name,
            quantity_sold,
            items = deducted.len(),
            "Sale deducted"
        );

        self.record_success(&transaction_ref, deducted.len(), started)
            .await;

        if let Some(trigger) = &self.reorder {
            match trigger.check_reorder(entry.store_id).await {
                Ok(Some(request)) => {
                    info!(request = %request.id, "Reorder filed after sale");
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Reorder check failed after sale"),
            }
        }

        Ok(Self::report(
            transaction_ref,
            DeductionOutcome::Applied { deducted },
            started,
        ))
    }

    /// Movements recorded for a transaction, for support lookups.
    ///
    /// # Errors
    ///
    /// Returns `DeductionError::Repository` if the query fails.
    pub async fn movements_for(
        &self,
        transaction_ref: &TransactionRef,
    ) -> Result<Vec<StockMovement>, DeductionError> {
        Ok(movements::list_by_transaction(&self.pool, transaction_ref).await?)
    }

    async fn record_success(
        &self,
        transaction_ref: &TransactionRef,
        items_processed: usize,
        started: std::time::Instant,
    ) {
        let entry = DeductionAudit {
            transaction_ref: transaction_ref.clone(),
            status: SyncStatus::Success,
            items_processed: i32::try_from(items_processed).unwrap_or(i32::MAX),
            error_detail: None,
            duration_ms: Self::elapsed_ms(started),
            created_at: Utc::now(),
        };
        if let Err(e) = audit::insert(&self.pool, &entry).await {
            warn!(error = %e, "Failed to record deduction audit");
        }
    }

    async fn record_failure(
        &self,
        transaction_ref: &TransactionRef,
        items_processed: usize,
        error: &DeductionError,
        started: std::time::Instant,
    ) {
        let entry = DeductionAudit {
            transaction_ref: transaction_ref.clone(),
            status: SyncStatus::Failed,
            items_processed: i32::try_from(items_processed).unwrap_or(i32::MAX),
            error_detail: Some(error.to_string()),
            duration_ms: Self::elapsed_ms(started),
            created_at: Utc::now(),
        };
        if let Err(e) = audit::insert(&self.pool, &entry).await {
            warn!(error = %e, "Failed to record deduction audit");
        }
    }

    fn report(
        transaction_ref: TransactionRef,
        outcome: DeductionOutcome,
        started: std::time::Instant,
    ) -> DeductionReport {
        DeductionReport {
            transaction_ref,
            outcome,
            duration_ms: Self::elapsed_ms(started),
        }
    }

    fn elapsed_ms(started: std::time::Instant) -> i64 {
        i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}
