//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod items;
mod products;
mod sessions;
mod tags;
mod todos;
mod users;

pub use items::*;
pub use products::*;
pub use sessions::*;
pub use tags::*;
pub use todos::*;
pub use users::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Confirmation envelope for deletes and logout.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Response type for endpoints that return only a confirmation message.
pub type MessageResult = Result<MessageResponse, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a confirmation response.
pub fn message(text: impl Into<String>) -> MessageResult {
    Ok(MessageResponse {
        success: true,
        message: text.into(),
    })
}

/// Reject requests whose session does not own the addressed resources.
pub(crate) fn check_owner(auth: &AuthUser, owner_id: i64) -> Result<(), AppError> {
    if auth.user_id != owner_id {
        return Err(AppError::Forbidden(
            "Resource belongs to a different user".to_string(),
        ));
    }
    Ok(())
}
