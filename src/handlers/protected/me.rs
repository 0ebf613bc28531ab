// handlers/protected/me.rs - GET /user/me/ handler

use axum::extract::{Extension, State};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /user/me/ - profile of the token holder (password hash never included)
pub async fn me_get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<User> {
    let user = state.users.profile(auth_user.id).await?;
    Ok(ApiResponse::success(user))
}
