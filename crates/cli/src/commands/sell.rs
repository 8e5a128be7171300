//! Sale recording against a catalog entry.

use larder_core::{CatalogEntryId, TransactionRef};
use larder_engine::services::{DeductionEngine, ReorderTrigger};

/// Deduct stock for a completed sale and print the deduction report.
///
/// # Errors
///
/// Returns an error if the sale cannot be applied; insufficient stock is
/// an error here, matching the all-or-nothing deduction contract.
pub async fn run(
    entry_id: CatalogEntryId,
    quantity: u32,
    transaction: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, pool) = super::connect().await?;
    let trigger = ReorderTrigger::new(pool.clone(), config.default_reorder_quantity);
    let engine = DeductionEngine::new(pool).with_reorder_trigger(trigger);

    let report = engine
        .record_sale(entry_id, quantity, TransactionRef::new(transaction))
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
