//! Recipe template storage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgExecutor;

use larder_core::{RecipeTemplate, TemplateId, TemplateIngredient, TemplateIngredientId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: TemplateId,
    name: String,
    category: String,
    yield_quantity: Decimal,
    serving_size: Decimal,
    suggested_price: Decimal,
    total_cost: Decimal,
    is_active: bool,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TemplateRow> for RecipeTemplate {
    fn from(r: TemplateRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            category: r.category,
            yield_quantity: r.yield_quantity,
            serving_size: r.serving_size,
            suggested_price: r.suggested_price,
            total_cost: r.total_cost,
            is_active: r.is_active,
            version: r.version,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct IngredientRow {
    id: TemplateIngredientId,
    template_id: TemplateId,
    ingredient_name: String,
    quantity: Decimal,
    unit: String,
    cost_per_unit: Decimal,
    category: Option<String>,
}

impl From<IngredientRow> for TemplateIngredient {
    fn from(r: IngredientRow) -> Self {
        Self {
            id: r.id,
            template_id: r.template_id,
            ingredient_name: r.ingredient_name,
            quantity: r.quantity,
            unit: r.unit,
            cost_per_unit: r.cost_per_unit,
            category: r.category,
        }
    }
}

const TEMPLATE_COLUMNS: &str = "id, name, category, yield_quantity, serving_size, \
     suggested_price, total_cost, is_active, version, created_at, updated_at";

/// Persist a template header row.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_template(
    exec: impl PgExecutor<'_>,
    template: &RecipeTemplate,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO recipe_templates (id, name, category, yield_quantity, serving_size, \
         suggested_price, total_cost, is_active, version, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(template.id)
    .bind(&template.name)
    .bind(&template.category)
    .bind(template.yield_quantity)
    .bind(template.serving_size)
    .bind(template.suggested_price)
    .bind(template.total_cost)
    .bind(template.is_active)
    .bind(template.version)
    .bind(template.created_at)
    .bind(template.updated_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Persist one ingredient row at the given position.
///
/// Ingredient rows are inserted individually so bulk imports can report
/// per-row failures without discarding the template.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_ingredient(
    exec: impl PgExecutor<'_>,
    ingredient: &TemplateIngredient,
    position: i32,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO template_ingredients (id, template_id, ingredient_name, quantity, unit, \
         cost_per_unit, category, position) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(ingredient.id)
    .bind(ingredient.template_id)
    .bind(&ingredient.ingredient_name)
    .bind(ingredient.quantity)
    .bind(ingredient.unit.as_str())
    .bind(ingredient.cost_per_unit)
    .bind(&ingredient.category)
    .bind(position)
    .execute(exec)
    .await?;
    Ok(())
}

/// Look up one template.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_template(
    exec: impl PgExecutor<'_>,
    id: TemplateId,
) -> Result<Option<RecipeTemplate>, RepositoryError> {
    let row = sqlx::query_as::<_, TemplateRow>(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM recipe_templates WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(row.map(RecipeTemplate::from))
}

/// The active template with this name, if one exists.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_active_by_name(
    exec: impl PgExecutor<'_>,
    name: &str,
) -> Result<Option<RecipeTemplate>, RepositoryError> {
    let row = sqlx::query_as::<_, TemplateRow>(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM recipe_templates \
         WHERE name = $1 AND is_active ORDER BY version DESC LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(exec)
    .await?;
    Ok(row.map(RecipeTemplate::from))
}

/// All templates, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_templates(
    exec: impl PgExecutor<'_>,
    active_only: bool,
) -> Result<Vec<RecipeTemplate>, RepositoryError> {
    let rows = sqlx::query_as::<_, TemplateRow>(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM recipe_templates \
         WHERE ($1 = FALSE OR is_active) ORDER BY created_at DESC"
    ))
    .bind(active_only)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(RecipeTemplate::from).collect())
}

/// Ingredient rows of a template, in authored order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_ingredients(
    exec: impl PgExecutor<'_>,
    template_id: TemplateId,
) -> Result<Vec<TemplateIngredient>, RepositoryError> {
    let rows = sqlx::query_as::<_, IngredientRow>(
        "SELECT id, template_id, ingredient_name, quantity, unit, cost_per_unit, category \
         FROM template_ingredients WHERE template_id = $1 ORDER BY position",
    )
    .bind(template_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(TemplateIngredient::from).collect())
}

/// Flip a template inactive. Templates are never hard-deleted; historical
/// recipes and catalog entries keep their provenance references.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no such template exists.
pub async fn deactivate(
    exec: impl PgExecutor<'_>,
    id: TemplateId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE recipe_templates SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(exec)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
