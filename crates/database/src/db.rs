use crate::config::StoreConfig;
use log::LevelFilter;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Creates a database connection pool
pub async fn create_connection(config: &StoreConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .acquire_timeout(config.mutation_timeout)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(options).await
}
