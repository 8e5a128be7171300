//! Availability analyzer: on-demand producibility reports.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use larder_core::availability::{ProductStatus, RecipeAvailability, analyze};
use larder_core::{CatalogEntryId, RecipeId, StoreId};

use crate::db::{RepositoryError, recipes};

/// Errors from availability queries.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("recipe {0} not found")]
    RecipeNotFound(RecipeId),

    #[error("catalog entry {0} not found")]
    CatalogEntryNotFound(CatalogEntryId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Availability of one sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAvailability {
    pub catalog_entry_id: CatalogEntryId,
    pub name: String,
    #[serde(flatten)]
    pub availability: RecipeAvailability,
}

/// Read-only projection of producibility against live stock.
///
/// Never errors for "missing" or "zero-producible" states; those are
/// normal, reportable values.
pub struct AvailabilityAnalyzer {
    pool: PgPool,
}

impl AvailabilityAnalyzer {
    /// Create an analyzer over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Producibility of one recipe against its store's current stock.
    ///
    /// # Errors
    ///
    /// Returns `AvailabilityError::RecipeNotFound` for unknown recipes.
    #[instrument(skip(self))]
    pub async fn analyze_recipe(
        &self,
        recipe_id: RecipeId,
    ) -> Result<RecipeAvailability, AvailabilityError> {
        recipes::get_recipe(&self.pool, recipe_id)
            .await?
            .ok_or(AvailabilityError::RecipeNotFound(recipe_id))?;
        let resolved = recipes::list_resolved_ingredients(&self.pool, recipe_id).await?;
        Ok(analyze(&resolved))
    }

    /// Availability of one catalog entry.
    ///
    /// Direct products (no recipe) report [`ProductStatus::DirectProduct`]
    /// with no ingredient detail; they always sell.
    ///
    /// # Errors
    ///
    /// Returns `AvailabilityError::CatalogEntryNotFound` for unknown entries.
    #[instrument(skip(self))]
    pub async fn analyze_catalog_entry(
        &self,
        catalog_entry_id: CatalogEntryId,
    ) -> Result<ProductAvailability, AvailabilityError> {
        let entry = recipes::get_catalog_entry(&self.pool, catalog_entry_id)
            .await?
            .ok_or(AvailabilityError::CatalogEntryNotFound(catalog_entry_id))?;

        let availability = match entry.recipe_id {
            Some(recipe_id) => {
                let resolved = recipes::list_resolved_ingredients(&self.pool, recipe_id).await?;
                analyze(&resolved)
            }
            None => RecipeAvailability {
                status: ProductStatus::DirectProduct,
                available_ingredients: 0,
                total_ingredients: 0,
                missing_ingredients: Vec::new(),
                max_production: 0,
            },
        };

        Ok(ProductAvailability {
            catalog_entry_id: entry.id,
            name: entry.name,
            availability,
        })
    }

    /// Availability of every catalog entry in a store, for dashboards.
    ///
    /// # Errors
    ///
    /// Returns `AvailabilityError::Repository` if a query fails.
    #[instrument(skip(self))]
    pub async fn analyze_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<ProductAvailability>, AvailabilityError> {
        let entries = recipes::list_catalog_entries(&self.pool, store_id).await?;
        let mut reports = Vec::with_capacity(entries.len());
        for entry in entries {
            let availability = match entry.recipe_id {
                Some(recipe_id) => {
                    let resolved =
                        recipes::list_resolved_ingredients(&self.pool, recipe_id).await?;
                    analyze(&resolved)
                }
                None => RecipeAvailability {
                    status: ProductStatus::DirectProduct,
                    available_ingredients: 0,
                    total_ingredients: 0,
                    missing_ingredients: Vec::new(),
                    max_production: 0,
                },
            };
            reports.push(ProductAvailability {
                catalog_entry_id: entry.id,
                name: entry.name,
                availability,
            });
        }
        Ok(reports)
    }
}
