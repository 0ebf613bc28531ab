use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from pool setup and migrations
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens the connection pool described by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let url = config
        .url
        .as_deref()
        .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(url)
        .await?;

    info!("Connected to database at {}", redacted_url(url)?);
    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Connection URL with the password masked, for logs.
pub fn redacted_url(raw: &str) -> Result<String, DatabaseError> {
    let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    if url.password().is_some() {
        url.set_password(Some("***"))
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    }
    Ok(url.into())
}
