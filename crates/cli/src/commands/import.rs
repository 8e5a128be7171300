//! Template import from exported recipe rows.

use larder_core::import::TemplateRow;
use larder_engine::services::RecipeTemplateRegistry;

/// Import a JSON array of flat recipe rows as versioned templates.
///
/// Prints one line per template with its outcome; a failed template does
/// not abort the batch.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the database
/// is unreachable.
pub async fn run(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(file)?;
    let rows: Vec<TemplateRow> = serde_json::from_str(&raw)?;

    let (_, pool) = super::connect().await?;
    let registry = RecipeTemplateRegistry::new(pool);
    let results = registry.import_rows(rows).await;

    #[allow(clippy::print_stdout)]
    for result in &results {
        match &result.outcome {
            Ok(import) if import.is_complete() => {
                println!(
                    "ok       {} (v{})",
                    result.template_name, import.template.version
                );
            }
            Ok(import) => {
                println!(
                    "partial  {} (v{}, {} ingredient(s) failed)",
                    result.template_name,
                    import.template.version,
                    import.failed_ingredients.len()
                );
            }
            Err(e) => {
                println!("failed   {}: {e}", result.template_name);
            }
        }
    }
    Ok(())
}
