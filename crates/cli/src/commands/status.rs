//! Store availability report.

use larder_core::StoreId;
use larder_engine::services::AvailabilityAnalyzer;

/// Print the availability of every catalog entry in a store as JSON.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn run(store_id: StoreId) -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;
    let analyzer = AvailabilityAnalyzer::new(pool);
    let reports = analyzer.analyze_store(store_id).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}
