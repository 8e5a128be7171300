//! Deployment projector: idempotent template fan-out to stores.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use larder_core::matcher::{SynonymTable, match_ingredient};
use larder_core::{
    CatalogEntry, CatalogEntryId, Category, CategoryId, IngredientMapping, Recipe, RecipeId,
    RecipeIngredient, RecipeIngredientId, StoreId, TemplateId,
};

use crate::db::{RepositoryError, inventory, recipes, templates};

/// Errors from deployment.
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("template {0} not found")]
    TemplateNotFound(TemplateId),

    #[error("template {0} is inactive and cannot be deployed")]
    TemplateInactive(TemplateId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Outcome of deploying one template into one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum DeploymentOutcome {
    /// A fresh recipe and catalog entry were created.
    Deployed {
        recipe_id: RecipeId,
        catalog_entry_id: CatalogEntryId,
        /// Authored ingredient names the matcher could not resolve in this
        /// store. The recipe deploys anyway and reports non-producible
        /// until these are mapped manually.
        unmapped_ingredients: Vec<String>,
    },
    /// The (template, store) pair was already deployed; nothing was written.
    Skipped { recipe_id: RecipeId },
}

/// Per-store result of a fan-out deployment.
#[derive(Debug)]
pub struct StoreDeployment {
    pub store_id: StoreId,
    pub result: Result<DeploymentOutcome, DeploymentError>,
}

/// Projects templates into per-store recipes and catalog entries.
pub struct DeploymentProjector {
    pool: PgPool,
    synonyms: SynonymTable,
}

impl DeploymentProjector {
    /// Create a projector with the given synonym configuration.
    #[must_use]
    pub const fn new(pool: PgPool, synonyms: SynonymTable) -> Self {
        Self { pool, synonyms }
    }

    /// Deploy one template into one store, idempotently.
    ///
    /// Re-deploying an already-deployed pair is a successful no-op. A
    /// missing category is created on the fly; deployment never fails for
    /// lack of organizational metadata. All writes for one store land in a
    /// single transaction.
    ///
    /// # Errors
    ///
    /// Returns `DeploymentError::TemplateNotFound` / `TemplateInactive` for
    /// bad templates, and `DeploymentError::Repository` on write failure.
    #[instrument(skip(self))]
    pub async fn deploy(
        &self,
        template_id: TemplateId,
        store_id: StoreId,
    ) -> Result<DeploymentOutcome, DeploymentError> {
        let template = templates::get_template(&self.pool, template_id)
            .await?
            .ok_or(DeploymentError::TemplateNotFound(template_id))?;
        if !template.is_active {
            return Err(DeploymentError::TemplateInactive(template_id));
        }

        if let Some(existing) =
            recipes::find_by_template_and_store(&self.pool, template_id, store_id).await?
        {
            info!(template = %template.name, %store_id, "Already deployed, skipping");
            return Ok(DeploymentOutcome::Skipped {
                recipe_id: existing.id,
            });
        }

        let ingredients = templates::list_ingredients(&self.pool, template_id).await?;
        let stock = inventory::list_matchable(&self.pool, store_id).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let category_id = match recipes::find_active_category(&mut *tx, store_id, &template.category)
            .await?
        {
            Some(category) => category.id,
            None => {
                let category = Category {
                    id: CategoryId::generate(),
                    store_id,
                    name: template.category.clone(),
                    is_active: true,
                };
                recipes::insert_category(&mut *tx, &category).await?;
                info!(category = %category.name, %store_id, "Created missing category");
                category.id
            }
        };

        let recipe = Recipe {
            id: RecipeId::generate(),
            store_id,
            template_id,
            name: template.name.clone(),
            yield_quantity: template.yield_quantity,
            serving_size: template.serving_size,
            total_cost: template.total_cost,
            price: template.suggested_price,
            is_active: true,
        };
        match recipes::insert_recipe(&mut *tx, &recipe).await {
            Ok(()) => {}
            // Concurrent deployment of the same pair: the unique constraint
            // fired, so someone else won. Report it as the usual no-op.
            Err(RepositoryError::Conflict(_)) => {
                drop(tx);
                let existing =
                    recipes::find_by_template_and_store(&self.pool, template_id, store_id)
                        .await?
                        .ok_or(RepositoryError::NotFound)?;
                return Ok(DeploymentOutcome::Skipped {
                    recipe_id: existing.id,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let mut unmapped = Vec::new();
        for ingredient in &ingredients {
            let candidate = match_ingredient(
                &ingredient.ingredient_name,
                &ingredient.unit,
                &stock,
                &self.synonyms,
            );
            if candidate.is_none() {
                unmapped.push(ingredient.ingredient_name.clone());
            }
            let row = RecipeIngredient {
                id: RecipeIngredientId::generate(),
                recipe_id: recipe.id,
                ingredient_name: ingredient.ingredient_name.clone(),
                quantity: ingredient.quantity,
                unit: ingredient.unit.clone(),
                cost_per_unit: ingredient.cost_per_unit,
                mapping: candidate.map(|c| IngredientMapping {
                    inventory_item_id: c.inventory_item_id,
                    confidence: c.confidence,
                    conversion_factor: c.conversion_factor,
                }),
            };
            recipes::insert_recipe_ingredient(&mut *tx, &row).await?;
        }

        let entry = CatalogEntry {
            id: CatalogEntryId::generate(),
            store_id,
            recipe_id: Some(recipe.id),
            category_id,
            name: template.name.clone(),
            price: template.suggested_price,
            is_available: true,
        };
        recipes::insert_catalog_entry(&mut *tx, &entry).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        if unmapped.is_empty() {
            info!(template = %template.name, %store_id, recipe = %recipe.id, "Deployed");
        } else {
            warn!(
                template = %template.name,
                %store_id,
                unmapped = ?unmapped,
                "Deployed with unresolved ingredients"
            );
        }

        Ok(DeploymentOutcome::Deployed {
            recipe_id: recipe.id,
            catalog_entry_id: entry.id,
            unmapped_ingredients: unmapped,
        })
    }

    /// Fan a template out to many stores, sequentially.
    ///
    /// Each store's outcome is independent: a failure in one store never
    /// blocks or rolls back the others.
    #[instrument(skip(self, store_ids), fields(stores = store_ids.len()))]
    pub async fn deploy_to_stores(
        &self,
        template_id: TemplateId,
        store_ids: &[StoreId],
    ) -> Vec<StoreDeployment> {
        let mut results = Vec::with_capacity(store_ids.len());
        for &store_id in store_ids {
            let result = self.deploy(template_id, store_id).await;
            if let Err(e) = &result {
                warn!(%template_id, %store_id, error = %e, "Store deployment failed");
            }
            results.push(StoreDeployment { store_id, result });
        }
        results
    }
}
