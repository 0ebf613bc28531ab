use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use supply_chain_api::config::{AppConfig, LoggingConfig};
use supply_chain_api::state::AppState;
use supply_chain_api::supply::audit;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(&config.logging)?;
    tracing::info!("Starting Supply Chain API in {:?} mode", config.environment);

    let bind_addr = config.bind_addr();
    let state = AppState::from_config(config).await.context("failed to open the store")?;
    let app = supply_chain_api::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Supply Chain API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Console output filtered by `RUST_LOG`, plus an append-only audit file
/// when `AUDIT_LOG_PATH` is set.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let console = fmt::layer().with_filter(EnvFilter::new(&logging.filter));

    let audit_file = match &logging.audit_log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open audit log {}", path.display()))?;
            let targets = Targets::new().with_target(audit::TARGET, tracing::Level::INFO);
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(targets),
            )
        }
        None => None,
    };

    tracing_subscriber::registry().with(console).with(audit_file).init();
    Ok(())
}
