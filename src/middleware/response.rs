use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// Handler output rendered as `{"success": true, "data": ...}`.
///
/// A 204 carries no body at all, whatever `data` holds.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status: StatusCode,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    success: bool,
    data: &'a T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data, status: StatusCode::OK }
    }

    pub fn created(data: T) -> Self {
        Self { data, status: StatusCode::CREATED }
    }
}

impl ApiResponse<()> {
    pub fn no_content() -> Self {
        Self { data: (), status: StatusCode::NO_CONTENT }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NO_CONTENT {
            return self.status.into_response();
        }

        // Serialize up front so a failure becomes the regular error envelope.
        match serde_json::to_value(Envelope { success: true, data: &self.data }) {
            Ok(body) => (self.status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal_server_error("Failed to serialize response data").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
