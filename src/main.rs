use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use moodmovie_api::api::{create_router, AppState};
use moodmovie_api::config::Config;
use moodmovie_api::db;
use moodmovie_api::services::{TmdbCatalog, UniformPicker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::ensure_schema(&pool).await?;

    let catalog = Arc::new(TmdbCatalog::new(
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
        Duration::from_millis(config.tmdb_timeout_ms),
    )?);

    let state = AppState::new(pool, catalog, Arc::new(UniformPicker));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(host = %config.host, port = config.port, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
