//! End-to-end pipeline test against a live database.
//!
//! Run with a disposable database:
//!
//! ```bash
//! LARDER_DATABASE_URL=postgres://localhost/larder_test \
//!     cargo test -p larder-engine -- --ignored
//! ```
//!
//! The test creates its own store and templates under unique names, so a
//! shared test database stays usable across runs.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use larder_core::availability::ProductStatus;
use larder_core::import::TemplateRow;
use larder_core::matcher::SynonymTable;
use larder_core::{
    CatalogEntry, CatalogEntryId, Category, CategoryId, InventoryItem, InventoryItemId, Recipe,
    RecipeId, RecipeTemplate, SyncStatus, TemplateId, TransactionRef,
};
use larder_engine::db::{audit, create_pool, inventory, recipes, stores, templates};
use larder_engine::services::deduction::{DeductionError, DeductionOutcome};
use larder_engine::services::projector::DeploymentOutcome;
use larder_engine::services::{
    AvailabilityAnalyzer, DeductionEngine, DeploymentProjector, RecipeTemplateRegistry,
};

async fn test_pool() -> sqlx::PgPool {
    let url = std::env::var("LARDER_DATABASE_URL")
        .expect("LARDER_DATABASE_URL must point at a test database")
        .into();
    let pool = create_pool(&url).await.expect("connect");
    larder_engine::MIGRATOR.run(&pool).await.expect("migrate");
    pool
}

fn item(store_id: larder_core::StoreId, name: &str, unit: &str, on_hand: i64) -> InventoryItem {
    InventoryItem {
        id: InventoryItemId::generate(),
        store_id,
        name: name.to_string(),
        unit: unit.to_string(),
        on_hand_quantity: Decimal::from(on_hand),
        minimum_threshold: Decimal::from(100),
        maximum_capacity: None,
        is_active: true,
        recipe_compatible: true,
        updated_at: Utc::now(),
    }
}

fn latte_rows(name: &str) -> Vec<TemplateRow> {
    let base = TemplateRow {
        recipe_name: name.to_string(),
        category: "Drinks".to_string(),
        ingredient_name: String::new(),
        quantity: Decimal::ZERO,
        unit: String::new(),
        cost_per_unit: Decimal::ONE,
        ingredient_category: None,
        yield_quantity: None,
        serving_size: None,
        suggested_price: Some(Decimal::from(120)),
    };
    vec![
        TemplateRow {
            ingredient_name: "Milk".to_string(),
            quantity: Decimal::from(120),
            unit: "ml".to_string(),
            ..base.clone()
        },
        TemplateRow {
            ingredient_name: "Espresso Beans".to_string(),
            quantity: Decimal::from(18),
            unit: "grams".to_string(),
            ..base
        },
    ]
}

fn croffle_rows(name: &str) -> Vec<TemplateRow> {
    let base = TemplateRow {
        recipe_name: name.to_string(),
        category: "Desserts".to_string(),
        ingredient_name: String::new(),
        quantity: Decimal::ZERO,
        unit: String::new(),
        cost_per_unit: Decimal::ONE,
        ingredient_category: None,
        yield_quantity: None,
        serving_size: None,
        suggested_price: Some(Decimal::from(95)),
    };
    vec![
        TemplateRow {
            ingredient_name: "Croissant".to_string(),
            quantity: Decimal::ONE,
            unit: "pieces".to_string(),
            ..base.clone()
        },
        TemplateRow {
            ingredient_name: "Whipped Cream".to_string(),
            quantity: Decimal::from(20),
            unit: "grams".to_string(),
            ..base
        },
    ]
}

async fn deploy_one(
    projector: &DeploymentProjector,
    template_id: TemplateId,
    store_id: larder_core::StoreId,
) -> CatalogEntryId {
    let outcome = projector.deploy(template_id, store_id).await.expect("deploy");
    let DeploymentOutcome::Deployed {
        catalog_entry_id, ..
    } = outcome
    else {
        panic!("expected fresh deployment");
    };
    catalog_entry_id
}

#[tokio::test]
#[ignore = "requires PostgreSQL via LARDER_DATABASE_URL"]
async fn test_import_deploy_analyze_and_sell() {
    let pool = test_pool().await;
    let run_tag = Uuid::new_v4().simple().to_string();

    let store = stores::insert(&pool, &format!("Test Store {run_tag}"))
        .await
        .expect("store");
    inventory::insert(&pool, &item(store.id, "Whole Milk", "ml", 4000))
        .await
        .expect("milk");
    inventory::insert(&pool, &item(store.id, "Espresso Beans", "grams", 900))
        .await
        .expect("beans");

    // Import: two rows group into one template.
    let template_name = format!("Latte {run_tag}");
    let registry = RecipeTemplateRegistry::new(pool.clone());
    let results = registry.import_rows(latte_rows(&template_name)).await;
    assert_eq!(results.len(), 1);
    let import = results
        .into_iter()
        .next()
        .and_then(|r| r.outcome.ok())
        .expect("import");
    assert!(import.is_complete());
    assert_eq!(import.template.version, 1);

    // Deploy: both ingredients resolve against the seeded stock.
    let projector = DeploymentProjector::new(pool.clone(), SynonymTable::builtin());
    let outcome = projector
        .deploy(import.template.id, store.id)
        .await
        .expect("deploy");
    let DeploymentOutcome::Deployed {
        recipe_id,
        catalog_entry_id,
        unmapped_ingredients,
    } = outcome
    else {
        panic!("expected fresh deployment");
    };
    assert!(unmapped_ingredients.is_empty());

    // Re-deploying the same pair is a no-op.
    let second = projector
        .deploy(import.template.id, store.id)
        .await
        .expect("redeploy");
    assert_eq!(second, DeploymentOutcome::Skipped { recipe_id });

    // Availability: 4000/120 = 33 lattes, 900/18 = 50, min is 33.
    let analyzer = AvailabilityAnalyzer::new(pool.clone());
    let availability = analyzer.analyze_recipe(recipe_id).await.expect("analyze");
    assert_eq!(availability.status, ProductStatus::ReadyToSell);
    assert_eq!(availability.max_production, 33);

    // Sale of 2: deducts 240 ml milk and 36 g beans in one transaction.
    let engine = DeductionEngine::new(pool.clone());
    let txn = TransactionRef::new(format!("pos-{run_tag}"));
    let report = engine
        .record_sale(catalog_entry_id, 2, txn.clone())
        .await
        .expect("sale");
    let DeductionOutcome::Applied { deducted } = report.outcome else {
        panic!("expected applied outcome");
    };
    assert_eq!(deducted.len(), 2);
    let milk = deducted
        .iter()
        .find(|d| d.ingredient_name == "Milk")
        .expect("milk line");
    assert_eq!(milk.applied, Decimal::from(240));
    assert_eq!(milk.new_quantity, Decimal::from(3760));

    // The ledger carries one sale movement per ingredient.
    let movements = engine.movements_for(&txn).await.expect("movements");
    assert_eq!(movements.len(), 2);
    for movement in &movements {
        assert_eq!(
            movement.new_quantity,
            movement.previous_quantity + movement.delta
        );
    }

    // Replay with the same transaction reference deducts nothing.
    let replay = engine
        .record_sale(catalog_entry_id, 2, txn.clone())
        .await
        .expect("replay");
    assert_eq!(replay.outcome, DeductionOutcome::AlreadyApplied);
    let resolved = recipes::list_resolved_ingredients(&pool, recipe_id)
        .await
        .expect("resolved");
    let milk_stock = resolved
        .iter()
        .find(|r| r.ingredient_name == "Milk")
        .and_then(|r| r.stock.as_ref())
        .expect("milk stock");
    assert_eq!(milk_stock.on_hand_quantity, Decimal::from(3760));
}

#[tokio::test]
#[ignore = "requires PostgreSQL via LARDER_DATABASE_URL"]
async fn test_line_items_sharing_a_transaction_each_deduct() {
    let pool = test_pool().await;
    let run_tag = Uuid::new_v4().simple().to_string();

    let store = stores::insert(&pool, &format!("Test Store {run_tag}"))
        .await
        .expect("store");
    for seeded in [
        item(store.id, "Whole Milk", "ml", 4000),
        item(store.id, "Espresso Beans", "grams", 900),
        item(store.id, "Croissant", "pieces", 50),
        item(store.id, "Whipped Cream", "grams", 500),
    ] {
        inventory::insert(&pool, &seeded).await.expect("seed item");
    }

    let registry = RecipeTemplateRegistry::new(pool.clone());
    let latte = registry
        .import_rows(latte_rows(&format!("Latte {run_tag}")))
        .await
        .into_iter()
        .next()
        .and_then(|r| r.outcome.ok())
        .expect("latte import");
    let croffle = registry
        .import_rows(croffle_rows(&format!("Croffle {run_tag}")))
        .await
        .into_iter()
        .next()
        .and_then(|r| r.outcome.ok())
        .expect("croffle import");

    let projector = DeploymentProjector::new(pool.clone(), SynonymTable::builtin());
    let latte_entry = deploy_one(&projector, latte.template.id, store.id).await;
    let croffle_entry = deploy_one(&projector, croffle.template.id, store.id).await;

    // One checkout, two line items, one shared transaction reference.
    let engine = DeductionEngine::new(pool.clone());
    let txn = TransactionRef::new(format!("pos-{run_tag}"));
    let first = engine
        .record_sale(latte_entry, 1, txn.clone())
        .await
        .expect("latte sale");
    assert!(matches!(first.outcome, DeductionOutcome::Applied { .. }));

    // The latte's movements carry the same reference but touch none of the
    // croffle's items, so the second line item must still deduct.
    let second = engine
        .record_sale(croffle_entry, 1, txn.clone())
        .await
        .expect("croffle sale");
    let DeductionOutcome::Applied { deducted } = second.outcome else {
        panic!("expected the second line item to deduct");
    };
    let croissant = deducted
        .iter()
        .find(|d| d.ingredient_name == "Croissant")
        .expect("croissant line");
    assert_eq!(croissant.applied, Decimal::ONE);
    assert_eq!(croissant.new_quantity, Decimal::from(49));

    // Replaying either line item is still caught.
    let replay = engine
        .record_sale(croffle_entry, 1, txn.clone())
        .await
        .expect("croffle replay");
    assert_eq!(replay.outcome, DeductionOutcome::AlreadyApplied);
    let replay = engine
        .record_sale(latte_entry, 1, txn)
        .await
        .expect("latte replay");
    assert_eq!(replay.outcome, DeductionOutcome::AlreadyApplied);
}

#[tokio::test]
#[ignore = "requires PostgreSQL via LARDER_DATABASE_URL"]
async fn test_failed_sales_leave_audit_entries() {
    let pool = test_pool().await;
    let run_tag = Uuid::new_v4().simple().to_string();
    let engine = DeductionEngine::new(pool.clone());

    // Unknown catalog entry.
    let missing_txn = TransactionRef::new(format!("pos-missing-{run_tag}"));
    let err = engine
        .record_sale(CatalogEntryId::generate(), 1, missing_txn.clone())
        .await
        .expect_err("unknown entry");
    assert!(matches!(err, DeductionError::ProductNotFound(_)));
    let entries = audit::list_by_transaction(&pool, &missing_txn)
        .await
        .expect("audit");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, SyncStatus::Failed);

    // A deployed recipe whose ingredient rows never landed.
    let store = stores::insert(&pool, &format!("Test Store {run_tag}"))
        .await
        .expect("store");
    let now = Utc::now();
    let template = RecipeTemplate {
        id: TemplateId::generate(),
        name: format!("Bare Mocha {run_tag}"),
        category: "Drinks".to_string(),
        yield_quantity: Decimal::ONE,
        serving_size: Decimal::ONE,
        suggested_price: Decimal::from(100),
        total_cost: Decimal::from(40),
        is_active: true,
        version: 1,
        created_at: now,
        updated_at: now,
    };
    templates::insert_template(&pool, &template)
        .await
        .expect("template");
    let recipe = Recipe {
        id: RecipeId::generate(),
        store_id: store.id,
        template_id: template.id,
        name: template.name.clone(),
        yield_quantity: Decimal::ONE,
        serving_size: Decimal::ONE,
        total_cost: Decimal::from(40),
        price: Decimal::from(100),
        is_active: true,
    };
    recipes::insert_recipe(&pool, &recipe).await.expect("recipe");
    let category = Category {
        id: CategoryId::generate(),
        store_id: store.id,
        name: "Drinks".to_string(),
        is_active: true,
    };
    recipes::insert_category(&pool, &category)
        .await
        .expect("category");
    let entry = CatalogEntry {
        id: CatalogEntryId::generate(),
        store_id: store.id,
        recipe_id: Some(recipe.id),
        category_id: category.id,
        name: recipe.name.clone(),
        price: recipe.price,
        is_available: true,
    };
    recipes::insert_catalog_entry(&pool, &entry)
        .await
        .expect("catalog entry");

    let bare_txn = TransactionRef::new(format!("pos-bare-{run_tag}"));
    let err = engine
        .record_sale(entry.id, 1, bare_txn.clone())
        .await
        .expect_err("recipe without ingredients");
    assert!(matches!(err, DeductionError::SetupRequired(_)));
    let entries = audit::list_by_transaction(&pool, &bare_txn)
        .await
        .expect("audit");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, SyncStatus::Failed);
    assert!(
        entries[0]
            .error_detail
            .as_deref()
            .is_some_and(|d| d.contains("no ingredients"))
    );
}

#[tokio::test]
#[ignore = "requires PostgreSQL via LARDER_DATABASE_URL"]
async fn test_reimport_bumps_version_and_retires_previous() {
    let pool = test_pool().await;
    let run_tag = Uuid::new_v4().simple().to_string();
    let registry = RecipeTemplateRegistry::new(pool.clone());
    let name = format!("Latte {run_tag}");

    let first = registry
        .import_rows(latte_rows(&name))
        .await
        .into_iter()
        .next()
        .and_then(|r| r.outcome.ok())
        .expect("first import");
    assert_eq!(first.template.version, 1);

    let second = registry
        .import_rows(latte_rows(&name))
        .await
        .into_iter()
        .next()
        .and_then(|r| r.outcome.ok())
        .expect("second import");
    assert_eq!(second.template.version, 2);

    let active = templates::find_active_by_name(&pool, &name)
        .await
        .expect("lookup")
        .expect("active template");
    assert_eq!(active.id, second.template.id);
    assert_eq!(active.version, 2);
    let retired = templates::get_template(&pool, first.template.id)
        .await
        .expect("lookup")
        .expect("first version");
    assert!(!retired.is_active);
}
