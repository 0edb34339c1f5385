use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_lookup_server::{
    cache::{CacheStore, MemoryCacheStore, SqliteCacheStore},
    clock::SystemClock,
    config::Config,
    repository::{spawn_cache_sweeper, RepositoryConfig, WeatherRepository},
    routes::{create_router, AppState},
    weather::WeatherApiClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_lookup_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let cache: Arc<dyn CacheStore> = if config.uses_memory_cache() {
        tracing::warn!("No DATABASE_URL configured, caching weather in memory");
        Arc::new(MemoryCacheStore::new())
    } else {
        Arc::new(SqliteCacheStore::connect(&config.database_url).await?)
    };
    let client = Arc::new(WeatherApiClient::from_config(&config)?);

    let repository = Arc::new(WeatherRepository::new(
        client,
        cache,
        Arc::new(SystemClock),
        RepositoryConfig::from(&config),
    ));

    if config.cache_sweep_interval_secs > 0 {
        tracing::info!(
            "Sweeping expired cache entries every {}s",
            config.cache_sweep_interval_secs
        );
        spawn_cache_sweeper(
            Arc::clone(&repository),
            Duration::from_secs(config.cache_sweep_interval_secs),
        );
    }

    let app = create_router(AppState::new(repository))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
