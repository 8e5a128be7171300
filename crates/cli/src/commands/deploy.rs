//! Template deployment to stores.

use larder_core::matcher::SynonymTable;
use larder_core::{StoreId, TemplateId};
use larder_engine::services::DeploymentProjector;
use larder_engine::services::projector::DeploymentOutcome;

/// Deploy one template to each listed store.
///
/// # Errors
///
/// Returns an error only on connection failure; per-store failures are
/// reported in the output.
pub async fn run(
    template_id: TemplateId,
    store_ids: &[StoreId],
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;
    let projector = DeploymentProjector::new(pool, SynonymTable::builtin());
    let deployments = projector.deploy_to_stores(template_id, store_ids).await;

    #[allow(clippy::print_stdout)]
    for deployment in &deployments {
        match &deployment.result {
            Ok(DeploymentOutcome::Deployed {
                recipe_id,
                unmapped_ingredients,
                ..
            }) if unmapped_ingredients.is_empty() => {
                println!("deployed {} -> recipe {recipe_id}", deployment.store_id);
            }
            Ok(DeploymentOutcome::Deployed {
                recipe_id,
                unmapped_ingredients,
                ..
            }) => {
                println!(
                    "deployed {} -> recipe {recipe_id} (unmapped: {})",
                    deployment.store_id,
                    unmapped_ingredients.join(", ")
                );
            }
            Ok(DeploymentOutcome::Skipped { recipe_id }) => {
                println!(
                    "skipped  {} (already recipe {recipe_id})",
                    deployment.store_id
                );
            }
            Err(e) => {
                println!("failed   {}: {e}", deployment.store_id);
            }
        }
    }
    Ok(())
}
