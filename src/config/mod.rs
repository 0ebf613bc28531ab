use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Secret used when running in development without JWT_SECRET.
const DEVELOPMENT_JWT_SECRET: &str = "development-only-jwt-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Process-wide settings, built once at startup and handed to the router
/// and CLI through `AppState`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub supply: SupplyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// When unset the server falls back to the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_hours: i64,
    pub cors_origins: Vec<String>,
    pub enable_audit_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyConfig {
    /// Upper bound on supplier links followed when computing a node level.
    pub max_hierarchy_depth: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub audit_log_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        if config.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("SUPPLY_API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("SUPPLY_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = parse_var("SUPPLY_API_PORT", &v)?;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_TOKEN_MINUTES") {
            self.security.access_token_minutes = parse_var("JWT_ACCESS_TOKEN_MINUTES", &v)?;
        }
        if let Ok(v) = env::var("JWT_REFRESH_TOKEN_HOURS") {
            self.security.refresh_token_hours = parse_var("JWT_REFRESH_TOKEN_HOURS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = v.parse().unwrap_or(self.security.enable_audit_logging);
        }

        // Supply overrides
        if let Ok(v) = env::var("SUPPLY_MAX_HIERARCHY_DEPTH") {
            self.supply.max_hierarchy_depth = parse_var("SUPPLY_MAX_HIERARCHY_DEPTH", &v)?;
        }

        // Logging overrides
        if let Ok(v) = env::var("RUST_LOG") {
            self.logging.filter = v;
        }
        if let Ok(v) = env::var("AUDIT_LOG_PATH") {
            self.logging.audit_log_path = Some(PathBuf::from(v));
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                access_token_minutes: 60,
                refresh_token_hours: 24,
                cors_origins: vec!["http://localhost:8000".to_string(), "http://127.0.0.1:8000".to_string()],
                enable_audit_logging: true,
            },
            supply: SupplyConfig {
                max_hierarchy_depth: 1000,
            },
            logging: LoggingConfig {
                filter: "info,supply_chain_api=debug,tower_http=debug".to_string(),
                audit_log_path: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_minutes: 60,
                refresh_token_hours: 24,
                cors_origins: vec![],
                enable_audit_logging: true,
            },
            supply: SupplyConfig {
                max_hierarchy_depth: 1000,
            },
            logging: LoggingConfig {
                filter: "info".to_string(),
                audit_log_path: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_minutes: 60,
                refresh_token_hours: 24,
                cors_origins: vec![],
                enable_audit_logging: true,
            },
            supply: SupplyConfig {
                max_hierarchy_depth: 1000,
            },
            logging: LoggingConfig {
                filter: "warn,supply_chain_api=info".to_string(),
                audit_log_path: None,
            },
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self.environment, Environment::Development)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
