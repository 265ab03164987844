//! Database connection pool management and schema migrations.

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

static PRIMARY_MIGRATIONS: Migrator = sqlx::migrate!("src/migrations/primary");
static SECONDARY_MIGRATIONS: Migrator = sqlx::migrate!("src/migrations/secondary");

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Creates a PostgreSQL connection pool with the given configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
}

/// Apply the primary store schema (users, teams, invitations, activity).
pub async fn run_primary_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running primary database migrations");
    PRIMARY_MIGRATIONS.run(pool).await
}

/// Apply the secondary store schema (presentations, moderation events).
pub async fn run_secondary_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running secondary database migrations");
    SECONDARY_MIGRATIONS.run(pool).await
}
