//! Store registry: the fan-out targets for deployment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use larder_core::StoreId;

use super::RepositoryError;

/// A physical store. Administration of stores is external; the engine only
/// needs them as scoping keys and fan-out targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Register a store.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the name is already taken.
pub async fn insert(exec: impl PgExecutor<'_>, name: &str) -> Result<Store, RepositoryError> {
    let store = Store {
        id: StoreId::generate(),
        name: name.to_string(),
        created_at: Utc::now(),
    };
    sqlx::query("INSERT INTO stores (id, name, created_at) VALUES ($1, $2, $3)")
        .bind(store.id)
        .bind(&store.name)
        .bind(store.created_at)
        .execute(exec)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("store name already exists: {name}"))
            }
            _ => RepositoryError::Database(e),
        })?;
    Ok(store)
}

/// All registered stores, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list(exec: impl PgExecutor<'_>) -> Result<Vec<Store>, RepositoryError> {
    let stores = sqlx::query_as::<_, Store>(
        "SELECT id, name, created_at FROM stores ORDER BY created_at",
    )
    .fetch_all(exec)
    .await?;
    Ok(stores)
}

/// Look up one store.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get(
    exec: impl PgExecutor<'_>,
    id: StoreId,
) -> Result<Option<Store>, RepositoryError> {
    let store =
        sqlx::query_as::<_, Store>("SELECT id, name, created_at FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(exec)
            .await?;
    Ok(store)
}
