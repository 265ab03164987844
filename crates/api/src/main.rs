use anyhow::{Context, Result};
use domain::store::Stores;
use persistence::db;
use std::time::Duration;
use tracing::{info, warn};

use slidehub_api::{app, config, middleware};

/// How often connection pool gauges are refreshed.
const POOL_METRICS_INTERVAL: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics().context("failed to install Prometheus recorder")?;

    info!("Starting Slidehub API v{}", env!("CARGO_PKG_VERSION"));

    let stores = match config.storage.backend {
        config::StorageBackend::Postgres => postgres_stores(&config).await?,
        config::StorageBackend::Memory => {
            warn!("Using in-memory stores; data will not survive a restart");
            Stores::in_memory()
        }
    };

    let app = app::create_app(config.clone(), stores);

    let addr = config.socket_addr().context("invalid server address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Connect both databases, run their migrations and wire the repositories.
async fn postgres_stores(config: &config::Config) -> Result<Stores> {
    let primary = db::create_pool(&config.primary_database.pool_config())
        .await
        .context("failed to connect to the primary database")?;
    let secondary = db::create_pool(&config.secondary_database.pool_config())
        .await
        .context("failed to connect to the secondary database")?;

    db::run_primary_migrations(&primary).await?;
    db::run_secondary_migrations(&secondary).await?;
    info!("Migrations completed");

    spawn_pool_metrics(primary.clone(), secondary.clone());

    Ok(persistence::postgres_stores(&primary, &secondary))
}

fn spawn_pool_metrics(primary: sqlx::PgPool, secondary: sqlx::PgPool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(POOL_METRICS_INTERVAL);
        loop {
            interval.tick().await;
            persistence::metrics::record_pool_metrics("primary", &primary);
            persistence::metrics::record_pool_metrics("secondary", &secondary);
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
