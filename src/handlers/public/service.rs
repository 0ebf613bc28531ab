// handlers/public/service.rs - GET / and GET /health

use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - service name, version and route overview
pub async fn root(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "Supply Chain API",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": format!("{:?}", state.config.environment),
        "endpoints": {
            "user": "/user/register/, /user/login/, /user/token/refresh/ (public), /user/me/ (protected)",
            "nodes": "/supply/nodes/[:id/[update/|delete/|products/[:product_id/]]] (protected)",
            "products": "/supply/products/[:id/[update/|delete/]] (protected)",
            "admin": "/supply/nodes/clear-debt/ (admin)",
            "health": "/health (public)"
        }
    })))
}

/// GET /health - store connectivity plus row counts
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = state.supply.health_check().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    let (nodes, products) = state.supply.counts().await?;
    let users = state.users.count().await?;
    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok",
        "nodes": nodes,
        "products": products,
        "users": users
    })))
}
