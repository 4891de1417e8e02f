use std::str::FromStr;

pub use sqlx::sqlite::{SqlitePool as DbPool, SqlitePoolOptions as DbPoolOptions};
use sqlx::sqlite::SqliteConnectOptions;

use crate::config::DatabaseConfig;

/// Opens the pool with foreign keys enforced on every connection.
///
/// An in-memory database lives only as long as its connection, so for
/// `sqlite::memory:` the pool holds exactly one connection and never recycles it.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::from_str(&config.url)?.foreign_keys(true);

    let options = if config.url.contains(":memory:") {
        DbPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        DbPoolOptions::new().max_connections(config.max_connections)
    };

    options.connect_with(connect_options).await
}

pub async fn migrate(db_pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(db_pool).await?;
    tracing::info!("Migrations complete.");
    Ok(())
}
