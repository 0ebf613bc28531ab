use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::database::models::{Role, User, UserId};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub is_superuser: bool,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            is_superuser: user.is_superuser,
        }
    }
}

/// JWT authentication middleware: validates the access token, loads the
/// (active) user and runs the rest of the request inside a span carrying
/// the user's email.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
    let user = state.users.authenticate(&token).await?;

    let auth_user = AuthUser::from(user);
    let span = tracing::info_span!("user", email = %auth_user.email);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).instrument(span).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
