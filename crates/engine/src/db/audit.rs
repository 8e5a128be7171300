//! Deduction call audit entries.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use larder_core::{DeductionAudit, SyncStatus, TransactionRef};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct AuditRow {
    transaction_ref: String,
    status: String,
    items_processed: i32,
    error_detail: Option<String>,
    duration_ms: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for DeductionAudit {
    type Error = RepositoryError;

    fn try_from(r: AuditRow) -> Result<Self, Self::Error> {
        let status = match r.status.as_str() {
            "success" => SyncStatus::Success,
            "failed" => SyncStatus::Failed,
            other => {
                return Err(RepositoryError::DataCorruption(format!(
                    "unknown audit status: {other}"
                )));
            }
        };
        Ok(Self {
            transaction_ref: TransactionRef::new(r.transaction_ref),
            status,
            items_processed: r.items_processed,
            error_detail: r.error_detail,
            duration_ms: r.duration_ms,
            created_at: r.created_at,
        })
    }
}

/// Record the outcome of one deduction call.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert(
    exec: impl PgExecutor<'_>,
    audit: &DeductionAudit,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO deduction_audit (id, transaction_ref, status, items_processed, \
         error_detail, duration_ms, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(Uuid::new_v4())
    .bind(audit.transaction_ref.as_str())
    .bind(audit.status.as_str())
    .bind(audit.items_processed)
    .bind(&audit.error_detail)
    .bind(audit.duration_ms)
    .bind(audit.created_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Audit entries recorded for one transaction, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_by_transaction(
    exec: impl PgExecutor<'_>,
    transaction_ref: &TransactionRef,
) -> Result<Vec<DeductionAudit>, RepositoryError> {
    let rows = sqlx::query_as::<_, AuditRow>(
        "SELECT transaction_ref, status, items_processed, error_detail, duration_ms, created_at \
         FROM deduction_audit WHERE transaction_ref = $1 ORDER BY created_at",
    )
    .bind(transaction_ref.as_str())
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(DeductionAudit::try_from).collect()
}
