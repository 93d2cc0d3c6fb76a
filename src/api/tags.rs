//! Tag API endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::{check_owner, message, success, ApiResult, MessageResult};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{CreateTagRequest, Tag, UpdateTagRequest};
use crate::AppState;

/// GET /api/tags/{ownerId} - List all tags, alphabetical by name.
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(owner_id): Path<i64>,
) -> ApiResult<Vec<Tag>> {
    check_owner(&auth, owner_id)?;
    success(state.repo.list_tags(owner_id).await?)
}

/// POST /api/tags - Create a new tag.
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateTagRequest>,
) -> ApiResult<Tag> {
    let owner_id = request
        .owner_id
        .ok_or_else(|| AppError::Validation("ownerId and name are required".to_string()))?;
    let name = match request.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => {
            return Err(AppError::Validation(
                "ownerId and name are required".to_string(),
            ))
        }
    };
    check_owner(&auth, owner_id)?;

    success(
        state
            .repo
            .create_tag(owner_id, &name, request.color.as_deref())
            .await?,
    )
}

/// PUT /api/tags/{id} - Update a tag's name and/or color.
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTagRequest>,
) -> ApiResult<Tag> {
    success(state.repo.update_tag(auth.user_id, id, &request).await?)
}

/// DELETE /api/tags/{id} - Delete a tag and its item associations.
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> MessageResult {
    state.repo.delete_tag(auth.user_id, id).await?;
    message("Tag deleted successfully")
}
