// handlers/public/user/login.rs - POST /user/login/ handler

use axum::extract::State;
use serde::Deserialize;

use crate::auth::TokenPair;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/**
 * POST /user/login/ - Exchange credentials for a token pair
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "data": { "access": "eyJhbGciOiJIUzI1NiI...", "refresh": "eyJhbGciOiJIUzI1NiI..." }
 * }
 * ```
 *
 * Unknown email, wrong password and inactive accounts all answer 401.
 */
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<TokenPair> {
    let tokens = state.users.login(&request.email, &request.password).await?;
    Ok(ApiResponse::success(tokens))
}
