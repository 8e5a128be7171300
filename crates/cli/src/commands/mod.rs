//! CLI command implementations.

use sqlx::PgPool;

use larder_engine::config::EngineConfig;
use larder_engine::db::create_pool;

pub mod deploy;
pub mod import;
pub mod migrate;
pub mod reorder;
pub mod seed;
pub mod sell;
pub mod status;
pub mod stores;

/// Load configuration and open a pool, shared by every command.
async fn connect() -> Result<(EngineConfig, PgPool), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    Ok((config, pool))
}
