use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::AuthUser;
use crate::error::ApiError;

/// Lets the request through only for admins. Must run after
/// `jwt_auth_middleware`.
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before admin check"))?;

    if !auth_user.is_admin() {
        tracing::warn!("Non-admin {} attempted an admin action", auth_user.email);
        return Err(ApiError::forbidden("You do not have permission to perform this action."));
    }

    Ok(next.run(request).await)
}
