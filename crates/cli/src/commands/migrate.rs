//! Database migration command.

/// Apply all pending migrations to the configured database.
///
/// # Errors
///
/// Returns an error if configuration is missing or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;

    tracing::info!("Running migrations...");
    larder_engine::MIGRATOR.run(&pool).await?;
    tracing::info!("Migrations complete");
    Ok(())
}
