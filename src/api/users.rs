//! User API endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::{check_owner, message, success, ApiResult, MessageResult};
use crate::auth::{self, AuthUser};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, User};
use crate::AppState;

/// GET /api/users - List all users.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    success(state.repo.list_users().await?)
}

/// POST /api/users - Sign up a new user. Open (no session required).
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    let required = |field: &Option<String>| {
        field
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let (Some(email), Some(username), Some(password)) = (
        required(&request.email),
        required(&request.username),
        request.password.clone().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Email, username, and password are required".to_string(),
        ));
    };

    let password_hash = auth::hash_password(&password);

    success(
        state
            .repo
            .create_user(
                &email,
                &username,
                &password_hash,
                request.first_name.as_deref(),
                request.last_name.as_deref(),
            )
            .await?,
    )
}

/// DELETE /api/users/{id} - Delete the authenticated user's own account.
/// Owned todos, items, tags, and sessions cascade.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> MessageResult {
    check_owner(&auth, id)?;
    state.repo.delete_user(id).await?;
    message("User deleted successfully")
}
