use std::sync::OnceLock;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config;

/// Errors from the PostgreSQL layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Update has no fields to set")]
    EmptyUpdate,

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owner of the process-wide connection pool
pub struct DatabaseManager;

static POOL: OnceLock<PgPool> = OnceLock::new();

impl DatabaseManager {
    /// Main pool. Connections are opened on first use, so a missing database
    /// only surfaces when a query actually runs.
    pub fn pool() -> Result<PgPool, DatabaseError> {
        if let Some(pool) = POOL.get() {
            return Ok(pool.clone());
        }

        let connection_string = Self::connection_string()?;
        let settings = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connection_timeout))
            .connect_lazy(&connection_string)?;

        let pool = POOL.get_or_init(|| pool).clone();
        info!("Created database pool (max {} connections)", settings.max_connections);
        Ok(pool)
    }

    fn connection_string() -> Result<String, DatabaseError> {
        let base = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
        Self::normalize_url(&base)
    }

    fn normalize_url(raw: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => {}
            _ => return Err(DatabaseError::InvalidDatabaseUrl),
        }
        if url.path().trim_start_matches('/').is_empty() {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(url.into())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool()?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Applies the embedded migrations
    pub async fn migrate() -> Result<(), DatabaseError> {
        let pool = Self::pool()?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close() {
        if let Some(pool) = POOL.get() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
