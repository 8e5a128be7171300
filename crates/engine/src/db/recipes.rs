//! Per-store recipes, categories, and the sellable catalog.

use rust_decimal::Decimal;
use sqlx::PgExecutor;

use larder_core::availability::{ResolvedIngredient, StockLevel};
use larder_core::matcher::MatchConfidence;
use larder_core::{
    CatalogEntry, CatalogEntryId, Category, CategoryId, IngredientMapping, InventoryItemId,
    Recipe, RecipeId, RecipeIngredient, RecipeIngredientId, StoreId, TemplateId,
};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: RecipeId,
    store_id: StoreId,
    template_id: TemplateId,
    name: String,
    yield_quantity: Decimal,
    serving_size: Decimal,
    total_cost: Decimal,
    price: Decimal,
    is_active: bool,
}

impl From<RecipeRow> for Recipe {
    fn from(r: RecipeRow) -> Self {
        Self {
            id: r.id,
            store_id: r.store_id,
            template_id: r.template_id,
            name: r.name,
            yield_quantity: r.yield_quantity,
            serving_size: r.serving_size,
            total_cost: r.total_cost,
            price: r.price,
            is_active: r.is_active,
        }
    }
}

const RECIPE_COLUMNS: &str =
    "id, store_id, template_id, name, yield_quantity, serving_size, total_cost, price, is_active";

/// The recipe already materialized for this (template, store) pair, if any.
///
/// Deployment's idempotency check.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_by_template_and_store(
    exec: impl PgExecutor<'_>,
    template_id: TemplateId,
    store_id: StoreId,
) -> Result<Option<Recipe>, RepositoryError> {
    let row = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE template_id = $1 AND store_id = $2"
    ))
    .bind(template_id)
    .bind(store_id)
    .fetch_optional(exec)
    .await?;
    Ok(row.map(Recipe::from))
}

/// Look up one recipe.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_recipe(
    exec: impl PgExecutor<'_>,
    id: RecipeId,
) -> Result<Option<Recipe>, RepositoryError> {
    let row = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(row.map(Recipe::from))
}

/// Persist a recipe header.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the (template, store) pair is
/// already deployed.
pub async fn insert_recipe(
    exec: impl PgExecutor<'_>,
    recipe: &Recipe,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO recipes (id, store_id, template_id, name, yield_quantity, serving_size, \
         total_cost, price, is_active) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(recipe.id)
    .bind(recipe.store_id)
    .bind(recipe.template_id)
    .bind(&recipe.name)
    .bind(recipe.yield_quantity)
    .bind(recipe.serving_size)
    .bind(recipe.total_cost)
    .bind(recipe.price)
    .bind(recipe.is_active)
    .execute(exec)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict(
            format!("recipe already deployed for template {}", recipe.template_id),
        ),
        _ => RepositoryError::Database(e),
    })?;
    Ok(())
}

/// Persist one resolved (or unresolved) ingredient row of a recipe.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_recipe_ingredient(
    exec: impl PgExecutor<'_>,
    ingredient: &RecipeIngredient,
) -> Result<(), RepositoryError> {
    let (item_id, confidence, factor) = match &ingredient.mapping {
        Some(m) => (
            Some(m.inventory_item_id),
            Some(m.confidence.as_str()),
            m.conversion_factor,
        ),
        None => (None, None, Decimal::ONE),
    };
    sqlx::query(
        "INSERT INTO recipe_ingredients (id, recipe_id, ingredient_name, quantity, unit, \
         cost_per_unit, inventory_item_id, match_confidence, conversion_factor) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(ingredient.id)
    .bind(ingredient.recipe_id)
    .bind(&ingredient.ingredient_name)
    .bind(ingredient.quantity)
    .bind(&ingredient.unit)
    .bind(ingredient.cost_per_unit)
    .bind(item_id)
    .bind(confidence)
    .bind(factor)
    .execute(exec)
    .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct RecipeIngredientRow {
    id: RecipeIngredientId,
    recipe_id: RecipeId,
    ingredient_name: String,
    quantity: Decimal,
    unit: String,
    cost_per_unit: Decimal,
    inventory_item_id: Option<InventoryItemId>,
    match_confidence: Option<String>,
    conversion_factor: Decimal,
}

impl TryFrom<RecipeIngredientRow> for RecipeIngredient {
    type Error = RepositoryError;

    fn try_from(r: RecipeIngredientRow) -> Result<Self, Self::Error> {
        let mapping = match (r.inventory_item_id, r.match_confidence) {
            (Some(item_id), Some(confidence)) => Some(IngredientMapping {
                inventory_item_id: item_id,
                confidence: confidence.parse::<MatchConfidence>().map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "recipe ingredient {}: {e}",
                        r.id
                    ))
                })?,
                conversion_factor: r.conversion_factor,
            }),
            (Some(_), None) | (None, Some(_)) => {
                return Err(RepositoryError::DataCorruption(format!(
                    "recipe ingredient {} has a half-written mapping",
                    r.id
                )));
            }
            (None, None) => None,
        };
        Ok(Self {
            id: r.id,
            recipe_id: r.recipe_id,
            ingredient_name: r.ingredient_name,
            quantity: r.quantity,
            unit: r.unit,
            cost_per_unit: r.cost_per_unit,
            mapping,
        })
    }
}

/// Ingredient rows of a recipe.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if a stored mapping is
/// half-written or carries an unknown confidence tier.
pub async fn list_recipe_ingredients(
    exec: impl PgExecutor<'_>,
    recipe_id: RecipeId,
) -> Result<Vec<RecipeIngredient>, RepositoryError> {
    let rows = sqlx::query_as::<_, RecipeIngredientRow>(
        "SELECT id, recipe_id, ingredient_name, quantity, unit, cost_per_unit, \
         inventory_item_id, match_confidence, conversion_factor \
         FROM recipe_ingredients WHERE recipe_id = $1 ORDER BY ingredient_name",
    )
    .bind(recipe_id)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(RecipeIngredient::try_from).collect()
}

#[derive(sqlx::FromRow)]
struct ResolvedRow {
    ingredient_name: String,
    quantity: Decimal,
    conversion_factor: Decimal,
    inventory_item_id: Option<InventoryItemId>,
    on_hand_quantity: Option<Decimal>,
}

/// A recipe's ingredients joined against live stock, ready for the pure
/// availability and deduction algorithms.
///
/// Mappings pointing at inactive items resolve as unmapped: the stock row
/// still exists but may no longer be consumed.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_resolved_ingredients(
    exec: impl PgExecutor<'_>,
    recipe_id: RecipeId,
) -> Result<Vec<ResolvedIngredient>, RepositoryError> {
    let rows = sqlx::query_as::<_, ResolvedRow>(
        "SELECT ri.ingredient_name, ri.quantity, ri.conversion_factor, \
                ii.id AS inventory_item_id, ii.on_hand_quantity \
         FROM recipe_ingredients ri \
         LEFT JOIN inventory_items ii ON ii.id = ri.inventory_item_id AND ii.is_active \
         WHERE ri.recipe_id = $1 ORDER BY ri.ingredient_name",
    )
    .bind(recipe_id)
    .fetch_all(exec)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ResolvedIngredient {
            ingredient_name: r.ingredient_name,
            quantity_per_unit: r.quantity,
            conversion_factor: r.conversion_factor,
            stock: match (r.inventory_item_id, r.on_hand_quantity) {
                (Some(id), Some(on_hand)) => Some(StockLevel {
                    inventory_item_id: id,
                    on_hand_quantity: on_hand,
                }),
                _ => None,
            },
        })
        .collect())
}

/// The active category with this name in a store, if any.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_active_category(
    exec: impl PgExecutor<'_>,
    store_id: StoreId,
    name: &str,
) -> Result<Option<Category>, RepositoryError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, store_id, name, is_active FROM categories \
         WHERE store_id = $1 AND name = $2 AND is_active",
    )
    .bind(store_id)
    .bind(name)
    .fetch_optional(exec)
    .await?;
    Ok(row.map(Category::from))
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    store_id: StoreId,
    name: String,
    is_active: bool,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Self {
            id: r.id,
            store_id: r.store_id,
            name: r.name,
            is_active: r.is_active,
        }
    }
}

/// Persist a category.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_category(
    exec: impl PgExecutor<'_>,
    category: &Category,
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT INTO categories (id, store_id, name, is_active) VALUES ($1, $2, $3, $4)")
        .bind(category.id)
        .bind(category.store_id)
        .bind(&category.name)
        .bind(category.is_active)
        .execute(exec)
        .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct CatalogRow {
    id: CatalogEntryId,
    store_id: StoreId,
    recipe_id: Option<RecipeId>,
    category_id: CategoryId,
    name: String,
    price: Decimal,
    is_available: bool,
}

impl From<CatalogRow> for CatalogEntry {
    fn from(r: CatalogRow) -> Self {
        Self {
            id: r.id,
            store_id: r.store_id,
            recipe_id: r.recipe_id,
            category_id: r.category_id,
            name: r.name,
            price: r.price,
            is_available: r.is_available,
        }
    }
}

/// Persist a catalog entry.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_catalog_entry(
    exec: impl PgExecutor<'_>,
    entry: &CatalogEntry,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO catalog_entries (id, store_id, recipe_id, category_id, name, price, \
         is_available) VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(entry.id)
    .bind(entry.store_id)
    .bind(entry.recipe_id)
    .bind(entry.category_id)
    .bind(&entry.name)
    .bind(entry.price)
    .bind(entry.is_available)
    .execute(exec)
    .await?;
    Ok(())
}

/// Look up one catalog entry.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_catalog_entry(
    exec: impl PgExecutor<'_>,
    id: CatalogEntryId,
) -> Result<Option<CatalogEntry>, RepositoryError> {
    let row = sqlx::query_as::<_, CatalogRow>(
        "SELECT id, store_id, recipe_id, category_id, name, price, is_available \
         FROM catalog_entries WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(row.map(CatalogEntry::from))
}

/// A store's catalog, by name.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_catalog_entries(
    exec: impl PgExecutor<'_>,
    store_id: StoreId,
) -> Result<Vec<CatalogEntry>, RepositoryError> {
    let rows = sqlx::query_as::<_, CatalogRow>(
        "SELECT id, store_id, recipe_id, category_id, name, price, is_available \
         FROM catalog_entries WHERE store_id = $1 ORDER BY name",
    )
    .bind(store_id)
    .fetch_all(exec)
    .await?;
    Ok(rows.into_iter().map(CatalogEntry::from).collect())
}
