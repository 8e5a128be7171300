//! Tests for deployment outcome shapes consumed by tooling.

use serde_json::json;

use larder_core::{CatalogEntryId, RecipeId, TemplateId};
use larder_engine::services::projector::{DeploymentError, DeploymentOutcome};

#[test]
fn test_deployed_outcome_carries_unmapped_names() {
    let outcome = DeploymentOutcome::Deployed {
        recipe_id: RecipeId::generate(),
        catalog_entry_id: CatalogEntryId::generate(),
        unmapped_ingredients: vec!["Saffron".to_string()],
    };

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["status"], json!("deployed"));
    assert_eq!(value["unmapped_ingredients"], json!(["Saffron"]));
}

#[test]
fn test_skipped_outcome_names_existing_recipe() {
    let recipe_id = RecipeId::generate();
    let outcome = DeploymentOutcome::Skipped { recipe_id };

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["status"], json!("skipped"));
    assert_eq!(value["recipe_id"], json!(recipe_id.to_string()));
}

#[test]
fn test_outcome_roundtrips() {
    let outcome = DeploymentOutcome::Deployed {
        recipe_id: RecipeId::generate(),
        catalog_entry_id: CatalogEntryId::generate(),
        unmapped_ingredients: Vec::new(),
    };
    let raw = serde_json::to_string(&outcome).unwrap();
    let back: DeploymentOutcome = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, outcome);
}

#[test]
fn test_inactive_template_error_message() {
    let id = TemplateId::generate();
    let error = DeploymentError::TemplateInactive(id);
    assert_eq!(
        error.to_string(),
        format!("template {id} is inactive and cannot be deployed")
    );
}
