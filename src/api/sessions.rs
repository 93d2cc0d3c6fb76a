//! Login and logout endpoints.

use axum::{extract::State, http::HeaderMap, Json};

use super::{message, success, ApiResult, MessageResult};
use crate::auth;
use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse};
use crate::AppState;

/// POST /api/auth/login - Verify credentials and issue a session token.
/// Open (no session required).
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    // Same message for unknown email and wrong password
    let Some((user, password_hash)) = state.repo.find_user_for_login(&email).await? else {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    };

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is deactivated".to_string()));
    }

    if !auth::verify_password(&password, &password_hash) {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    state.repo.touch_last_login(user.id).await?;
    let session = state
        .repo
        .create_session(user.id, state.config.session_ttl_hours)
        .await?;

    success(LoginResponse {
        user,
        token: session.token,
        expires_at: session.expires_at,
    })
}

/// POST /api/auth/logout - Invalidate the presented session token.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> MessageResult {
    if let Some(token) = auth::token_from_headers(&headers) {
        state.repo.delete_session(&token).await?;
    }
    message("Logged out successfully")
}
