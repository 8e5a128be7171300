//! Recipe template registry: versioned, store-independent definitions.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use larder_core::import::{TemplateRow, ValidationIssue, group_rows, validate_definition};
use larder_core::{
    RecipeTemplate, TemplateDefinition, TemplateId, TemplateIngredient, TemplateIngredientId,
};

use crate::db::{RepositoryError, templates};

/// Default markup applied when a definition carries no authored price.
const DEFAULT_PRICE_MARKUP: Decimal = Decimal::from_parts(15, 0, 0, false, 1); // 1.5

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The definition failed validation; carries every issue found.
    #[error("invalid template definition: {}", issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid { issues: Vec<ValidationIssue> },

    /// Repository failure creating the template header.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// An ingredient row that failed to persist during template creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedIngredient {
    pub ingredient_name: String,
    pub reason: String,
}

/// Result of creating one template.
///
/// Imports are bulk; a template whose header landed but lost some
/// ingredient rows is reported as incomplete, not rolled back, so partial
/// progress stays visible to operators.
#[derive(Debug, Clone)]
pub struct TemplateImport {
    pub template: RecipeTemplate,
    pub failed_ingredients: Vec<FailedIngredient>,
}

impl TemplateImport {
    /// Whether every ingredient row persisted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_ingredients.is_empty()
    }
}

/// Per-template outcome of a bulk import.
#[derive(Debug)]
pub struct TemplateImportResult {
    pub template_name: String,
    pub outcome: Result<TemplateImport, RegistryError>,
}

/// Versioned storage for store-independent recipe definitions.
pub struct RecipeTemplateRegistry {
    pool: PgPool,
}

impl RecipeTemplateRegistry {
    /// Create a new registry over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a validated definition as a new template.
    ///
    /// If an active template with the same name exists it is deactivated
    /// and the new one takes its version plus one (version bump). Ingredient
    /// rows are inserted one by one; failures are collected per row and the
    /// template is left in place, flagged incomplete.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Invalid` when validation fails, or
    /// `RegistryError::Repository` when the header itself cannot be created.
    #[instrument(skip(self, definition), fields(template = %definition.name))]
    pub async fn create_template(
        &self,
        definition: &TemplateDefinition,
    ) -> Result<TemplateImport, RegistryError> {
        let issues = validate_definition(definition);
        if !issues.is_empty() {
            return Err(RegistryError::Invalid { issues });
        }

        let previous = templates::find_active_by_name(&self.pool, &definition.name).await?;
        let version = previous.as_ref().map_or(1, |p| p.version + 1);

        let total_cost = definition.total_cost();
        let now = Utc::now();
        let template = RecipeTemplate {
            id: TemplateId::generate(),
            name: definition.name.clone(),
            category: definition.category.clone(),
            yield_quantity: definition.yield_quantity,
            serving_size: definition.serving_size,
            suggested_price: definition
                .suggested_price
                .unwrap_or(total_cost * DEFAULT_PRICE_MARKUP),
            total_cost,
            is_active: true,
            version,
            created_at: now,
            updated_at: now,
        };
        // Header and version handover commit together. The previous version
        // stays active until the new header is durably in place, so a failed
        // insert never leaves the name with no active template.
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        templates::insert_template(&mut *tx, &template).await?;
        if let Some(previous) = &previous {
            templates::deactivate(&mut *tx, previous.id).await?;
        }
        tx.commit().await.map_err(RepositoryError::from)?;
        if let Some(previous) = &previous {
            info!(
                template = %definition.name,
                previous_version = previous.version,
                "Deactivated previous template version"
            );
        }

        let mut failed_ingredients = Vec::new();
        for (position, ingredient) in definition.ingredients.iter().enumerate() {
            let row = TemplateIngredient {
                id: TemplateIngredientId::generate(),
                template_id: template.id,
                ingredient_name: ingredient.ingredient_name.clone(),
                quantity: ingredient.quantity,
                unit: ingredient.unit.clone(),
                cost_per_unit: ingredient.cost_per_unit,
                category: ingredient.category.clone(),
            };
            let position = i32::try_from(position).unwrap_or(i32::MAX);
            if let Err(e) = templates::insert_ingredient(&self.pool, &row, position).await {
                warn!(
                    template = %template.name,
                    ingredient = %row.ingredient_name,
                    error = %e,
                    "Failed to persist ingredient row"
                );
                failed_ingredients.push(FailedIngredient {
                    ingredient_name: row.ingredient_name,
                    reason: e.to_string(),
                });
            }
        }

        info!(
            template = %template.name,
            version = template.version,
            ingredients = definition.ingredients.len(),
            failed = failed_ingredients.len(),
            "Created template"
        );

        Ok(TemplateImport {
            template,
            failed_ingredients,
        })
    }

    /// Import flat rows from the external pipeline, one template per
    /// distinct recipe name.
    ///
    /// Each template's outcome is reported independently; one bad group
    /// never aborts the rest of the batch.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn import_rows(&self, rows: Vec<TemplateRow>) -> Vec<TemplateImportResult> {
        let definitions = group_rows(rows);
        let mut results = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let template_name = definition.name.clone();
            let outcome = self.create_template(&definition).await;
            if let Err(e) = &outcome {
                warn!(template = %template_name, error = %e, "Template import failed");
            }
            results.push(TemplateImportResult {
                template_name,
                outcome,
            });
        }
        results
    }

    /// Deactivate a template. Never deletes; historical recipes and catalog
    /// entries keep their references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such template exists.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: TemplateId) -> Result<(), RegistryError> {
        templates::deactivate(&self.pool, id).await?;
        Ok(())
    }

    /// Look up one template.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Repository` if the query fails.
    pub async fn get(&self, id: TemplateId) -> Result<Option<RecipeTemplate>, RegistryError> {
        Ok(templates::get_template(&self.pool, id).await?)
    }

    /// List templates, optionally only active ones.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Repository` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<RecipeTemplate>, RegistryError> {
        Ok(templates::list_templates(&self.pool, active_only).await?)
    }

    /// Ingredient rows of a template, in authored order.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Repository` if the query fails.
    pub async fn ingredients(
        &self,
        id: TemplateId,
    ) -> Result<Vec<TemplateIngredient>, RegistryError> {
        Ok(templates::list_ingredients(&self.pool, id).await?)
    }
}
