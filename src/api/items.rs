//! Item API endpoints.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::{check_owner, message, success, ApiResult, MessageResult};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{
    CreateItemRequest, ItemFilters, ItemType, ItemWithTags, UpdateItemRequest,
};
use crate::AppState;

/// GET /api/items/{ownerId} - List non-archived items with their tags.
pub async fn list_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(owner_id): Path<i64>,
) -> ApiResult<Vec<ItemWithTags>> {
    check_owner(&auth, owner_id)?;
    success(state.repo.list_items(owner_id).await?)
}

/// POST /api/items - Create a new item, optionally with tags.
pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateItemRequest>,
) -> ApiResult<ItemWithTags> {
    let owner_id = request
        .owner_id
        .ok_or_else(|| AppError::Validation("ownerId and content are required".to_string()))?;
    let content = match request.content.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => {
            return Err(AppError::Validation(
                "ownerId and content are required".to_string(),
            ))
        }
    };
    check_owner(&auth, owner_id)?;

    success(state.repo.create_item(owner_id, &content, &request).await?)
}

/// PUT /api/items/{id} - Partially update an item, including its tag set.
pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateItemRequest>,
) -> ApiResult<ItemWithTags> {
    success(state.repo.update_item(auth.user_id, id, &request).await?)
}

/// DELETE /api/items/{id} - Delete an item.
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> MessageResult {
    state.repo.delete_item(auth.user_id, id).await?;
    message("Item deleted successfully")
}

/// Query parameters accepted by the item search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchItemsQuery {
    /// Exact item type, or "all" for no filter.
    #[serde(default)]
    pub item_type: Option<String>,
    /// "true" / "false", or "all" for no filter.
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
    /// Comma-separated tag ids; an item must carry at least one.
    #[serde(default)]
    pub tags: Option<String>,
}

/// GET /api/items/search/{ownerId} - Filtered item search.
pub async fn search_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(owner_id): Path<i64>,
    Query(params): Query<SearchItemsQuery>,
) -> ApiResult<Vec<ItemWithTags>> {
    check_owner(&auth, owner_id)?;
    let filters = filters_from_query(&params)?;
    success(state.repo.search_items(owner_id, &filters).await?)
}

fn filters_from_query(params: &SearchItemsQuery) -> Result<ItemFilters, AppError> {
    let item_type = match params.item_type.as_deref() {
        None | Some("all") => None,
        Some(s) => Some(
            ItemType::from_str(s)
                .ok_or_else(|| AppError::Validation(format!("Unknown item type: {}", s)))?,
        ),
    };

    let completed = match params.completed.as_deref() {
        None | Some("all") => None,
        Some(s) => Some(s == "true"),
    };

    let tag_ids = match params.tags.as_deref() {
        None | Some("") => Vec::new(),
        Some(s) => s
            .split(',')
            .map(|id| {
                id.trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::Validation(format!("Invalid tag id: {}", id)))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(ItemFilters {
        item_type,
        completed,
        archived: params.archived,
        pinned: params.pinned,
        tag_ids,
        search: params.search.clone(),
    })
}
