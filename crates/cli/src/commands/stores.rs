//! Store management commands.

use larder_engine::db::stores;

/// Register a new store and print its id.
///
/// # Errors
///
/// Returns an error if the name is already taken or the insert fails.
pub async fn add(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;
    let store = stores::insert(&pool, name).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}  {}", store.id, store.name);
    }
    Ok(())
}

/// List registered stores.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;
    let all = stores::list(&pool).await?;

    #[allow(clippy::print_stdout)]
    {
        for store in all {
            println!("{}  {}", store.id, store.name);
        }
    }
    Ok(())
}
