// --- File: backend/src/main.rs ---

use anyhow::Context;
use backend::{
    config::AppConfig,
    db,
    web_server::{run_server, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Setup ---
    // 1. Initialize structured logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO) // This sets the minimum level to INFO
        .init();

    // 2. Configuration, database and schema
    let app_config = AppConfig::from_env().context("failed to load configuration")?;

    let db_pool = db::connect(&app_config.database)
        .await
        .with_context(|| format!("failed to open database {}", app_config.database.url))?;

    db::migrate(&db_pool).await.context("failed to run migrations")?;

    let app_state = AppState {
        db_pool,
        app_config,
    };

    // --- Run Server ---
    tracing::info!("Initializing server...");
    run_server(app_state).await.context("server error")?;
    Ok(())
}
