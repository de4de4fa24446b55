use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use learnvow_api::api::{create_router, AppState};
use learnvow_api::cache::TtlCache;
use learnvow_api::config::Config;
use learnvow_api::db;
use learnvow_api::services::OfflineManager;
use learnvow_api::store::PostgresStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "learnvow_api=info,tower_http=info".into()),
        )
        .init();

    let pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let store = Arc::new(PostgresStore::new(pool));
    let (cache, sweeper) = TtlCache::new(
        Duration::from_secs(config.cache_ttl_secs),
        Duration::from_secs(config.cache_sweep_secs),
    );
    let offline = OfflineManager::load(
        config.offline_state_path.as_str(),
        Duration::from_millis(config.download_tick_ms),
        config.download_step_percent,
    )?;

    let state = AppState::new(store, cache, offline);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "LearnVow API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
