use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{manager, DatabaseError, MemoryStore, PgStore, SupplyRepository, UserRepository};
use crate::services::{SupplyService, UserService};
use crate::supply::Audit;

/// Shared state handed to every handler and to the CLI.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub supply: SupplyService,
    pub users: UserService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        supply_repo: Arc<dyn SupplyRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        let audit = Audit::new(config.security.enable_audit_logging);
        let supply = SupplyService::new(supply_repo, config.supply.max_hierarchy_depth, audit);
        let users = UserService::new(user_repo, config.security.clone(), audit);
        Self {
            config: Arc::new(config),
            supply,
            users,
        }
    }

    /// State over a fresh in-process store.
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }

    /// State over PostgreSQL; applies migrations when configured to.
    pub async fn connect(config: AppConfig) -> Result<Self, DatabaseError> {
        let pool = manager::connect(&config.database).await?;
        if config.database.run_migrations {
            manager::run_migrations(&pool).await?;
        }
        let store = Arc::new(PgStore::new(pool));
        Ok(Self::new(config, store.clone(), store))
    }

    /// PostgreSQL when `DATABASE_URL` is configured, memory otherwise.
    pub async fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        if config.database.url.is_some() {
            Self::connect(config).await
        } else {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Ok(Self::in_memory(config))
        }
    }
}
