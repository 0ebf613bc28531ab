// handlers/public/user/register.rs - POST /user/register/ handler

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::RegisterForm;
use crate::state::AppState;

/**
 * POST /user/register/ - Create a user account
 *
 * Expected Input:
 * ```json
 * {
 *   "email": "ivanov@example.com",
 *   "password": "P4$$w0rd",
 *   "password_confirmation": "P4$$w0rd",
 *   "first_name": "Ivan",       // optional
 *   "last_name": "Ivanov",      // optional
 *   "phone": "+71234567890"     // optional
 * }
 * ```
 *
 * Responds 201 with `{"message": "User <email> registered successfully."}`.
 * Field problems (taken email, short password, mismatched confirmation)
 * come back as VALIDATION_ERROR with `field_errors`.
 */
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<RegisterForm>,
) -> ApiResult<Value> {
    let user = state.users.register(form).await?;

    Ok(ApiResponse::created(json!({
        "message": format!("User {} registered successfully.", user.email)
    })))
}
