use anyhow::Context;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::manager;

/// `supplyctl migrate` - applies the embedded migrations to `DATABASE_URL`.
pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = manager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    manager::run_migrations(&pool).await?;

    let target = match config.database.url.as_deref() {
        Some(url) => manager::redacted_url(url)?,
        None => String::new(),
    };
    output_success(
        output_format,
        &format!("Migrations applied to {}", target),
        Some(json!({ "database": target })),
    )
}
