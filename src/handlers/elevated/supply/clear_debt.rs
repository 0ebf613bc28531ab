// handlers/elevated/supply/clear_debt.rs - POST /supply/nodes/clear-debt/ handler

use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::NodeId;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::supply::FieldErrors;

#[derive(Debug, Deserialize)]
pub struct ClearDebtRequest {
    pub ids: Vec<NodeId>,
}

/**
 * POST /supply/nodes/clear-debt/ - Zero the debt of the selected nodes
 *
 * Expected Input:  `{"ids": [1, 2, 3]}`
 * Expected Output: `{"success": true, "data": {"cleared": 3}}`
 *
 * Only the listed nodes change; unknown ids are skipped. This and node
 * creation are the only ways `debt_to_supplier` is ever written.
 */
pub async fn clear_debt_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<ClearDebtRequest>,
) -> ApiResult<Value> {
    if request.ids.is_empty() {
        return Err(FieldErrors::single("ids", "This list may not be empty.").into());
    }

    let cleared = state.supply.clear_debt(&auth_user.email, &request.ids).await?;
    Ok(ApiResponse::success(json!({ "cleared": cleared })))
}
