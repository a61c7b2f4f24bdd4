use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

use crate::shared::config::Config;

/// Connects with the configured pool limits and brings the schema up to date.
pub async fn connect_postgres(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .connect_timeout(Duration::from_secs(config.database_connect_timeout))
        .idle_timeout(Duration::from_secs(config.database_idle_timeout))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    tracing::info!("Connected to database");

    Migrator::up(&db, None).await?;
    tracing::info!("Migrations applied");

    Ok(db)
}
