// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::AuthError;
use crate::database::repository::RepositoryError;
use crate::services::supply_service::SupplyError;
use crate::services::user_service::UserError;
use crate::supply::FieldErrors;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found, with a code naming the missing entity
    NotFound { code: &'static str, message: String },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound { .. } => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound { code, .. } => code,
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            code: "NOT_FOUND",
            message: message.into(),
        }
    }

    pub fn node_not_found(id: i64) -> Self {
        ApiError::NotFound {
            code: "NODE_NOT_FOUND",
            message: format!("Node {} not found", id),
        }
    }

    pub fn product_not_found(id: i64) -> Self {
        ApiError::NotFound {
            code: "PRODUCT_NOT_FOUND",
            message: format!("Product {} not found", id),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::validation_error("Validation failed", Some(errors.into_inner()))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueViolation { field } => {
                FieldErrors::single(field, format!("This {} is already in use.", field)).into()
            }
            RepositoryError::ForeignKeyViolation { field } => {
                FieldErrors::single(field, "Invalid value.").into()
            }
            RepositoryError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            RepositoryError::Database(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Crypto(msg) | AuthError::TokenGeneration(msg) => {
                tracing::error!("Auth failure: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            AuthError::MissingSecret => {
                tracing::error!("JWT secret not configured");
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            other => ApiError::unauthorized(other.to_string()),
        }
    }
}

impl From<SupplyError> for ApiError {
    fn from(err: SupplyError) -> Self {
        match err {
            SupplyError::Validation(errors) => errors.into(),
            SupplyError::NodeNotFound(id) => ApiError::node_not_found(id),
            SupplyError::ProductNotFound(id) => ApiError::product_not_found(id),
            SupplyError::Hierarchy(e) => {
                tracing::error!("Supplier hierarchy error: {}", e);
                ApiError::internal_server_error("Supplier hierarchy is inconsistent")
            }
            SupplyError::Repository(e) => e.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(errors) => errors.into(),
            UserError::NotFound(id) => ApiError::not_found(format!("User {} not found", id)),
            UserError::Auth(e) => e.into(),
            UserError::Repository(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_field_errors() {
        let err: ApiError = FieldErrors::single("name", "This field is required.").into();
        let body = err.to_json();
        assert_eq!(err.status_code(), 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["name"], "This field is required.");
    }

    #[test]
    fn not_found_codes_name_the_entity() {
        assert_eq!(ApiError::from(SupplyError::NodeNotFound(3)).error_code(), "NODE_NOT_FOUND");
        assert_eq!(ApiError::from(SupplyError::ProductNotFound(3)).error_code(), "PRODUCT_NOT_FOUND");
        assert_eq!(ApiError::node_not_found(3).status_code(), 404);
    }

    #[test]
    fn token_errors_are_unauthorized() {
        let err = ApiError::from(AuthError::TokenExpired);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_json()["code"], "UNAUTHORIZED");
        assert!(err.to_json().get("field_errors").is_none());
    }

    #[test]
    fn database_details_are_not_exposed() {
        let err = ApiError::from(RepositoryError::Database(sqlx::Error::RowNotFound));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Database error occurred");
    }
}
