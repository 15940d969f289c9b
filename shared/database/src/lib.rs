pub mod postgres;
pub mod migrations;
pub mod memory;
pub mod repositories;
pub mod store;

pub use postgres::{PostgresPool, create_postgres_pool};
pub use memory::MemoryStore;
pub use repositories::*;
pub use store::ProcurementStore;

use anyhow::Result;
use std::time::Duration;
use vms_utils::DatabaseConfig;

/// Connects to PostgreSQL and, when configured, brings the schema up to date.
pub async fn initialize_store(config: &DatabaseConfig) -> Result<PostgresStore> {
    let pool = create_postgres_pool(
        &config.postgres_url,
        config.max_connections,
        Duration::from_secs(config.connection_timeout_seconds),
    )
    .await?;

    if config.run_migrations {
        migrations::run_postgres_migrations(&pool).await?;
    }

    Ok(PostgresStore::new(pool))
}
