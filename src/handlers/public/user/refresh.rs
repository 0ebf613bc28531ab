// handlers/public/user/refresh.rs - POST /user/token/refresh/ handler

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// POST /user/token/refresh/ - `{"refresh": ...}` to `{"access": ...}`.
/// Access tokens are not accepted here.
pub async fn refresh_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> ApiResult<Value> {
    let access = state.users.refresh(&request.refresh).await?;
    Ok(ApiResponse::success(json!({ "access": access })))
}
