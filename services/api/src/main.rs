use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::{
    AppState,
    catalog::{CatalogService, bundled_catalog},
    config::ApiConfig,
    repositories::PgMovieStore,
    routes,
};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting catalog API service");

    let config = ApiConfig::from_env()?;

    // The pool connects lazily so the bundled catalog can serve while the
    // database is down
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config)?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        warn!("Database unreachable, catalog reads will fall back to the bundled catalog");
    }

    let mut catalog = CatalogService::new(
        Arc::new(PgMovieStore::new(pool)),
        bundled_catalog()?,
        config.page_size,
    );

    match RedisConfig::from_env().map(|redis| RedisPool::new(&redis)) {
        Some(Ok(cache)) => {
            info!("Movie cache enabled");
            catalog = catalog.with_cache(cache);
        }
        Some(Err(e)) => warn!("Movie cache disabled: {}", e),
        None => info!("REDIS_URL not set, movie cache disabled"),
    }

    let app = routes::create_router(AppState { catalog });

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Catalog API listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
