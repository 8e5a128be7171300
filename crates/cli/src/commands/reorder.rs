//! Manual reorder scan.

use larder_core::StoreId;
use larder_engine::services::ReorderTrigger;

/// Scan a store for depleted items and file a reorder request if needed.
///
/// # Errors
///
/// Returns an error if the scan or insert fails.
pub async fn run(store_id: StoreId) -> Result<(), Box<dyn std::error::Error>> {
    let (config, pool) = super::connect().await?;
    let trigger = ReorderTrigger::new(pool, config.default_reorder_quantity);

    #[allow(clippy::print_stdout)]
    match trigger.check_reorder(store_id).await? {
        Some(request) => {
            println!("request {}", request.id);
            for line in &request.lines {
                println!(
                    "  {}  on hand {}  threshold {}  requested {}",
                    line.item_name,
                    line.on_hand_quantity,
                    line.minimum_threshold,
                    line.requested_quantity
                );
            }
        }
        None => println!("stock healthy, no reorder needed"),
    }
    Ok(())
}
