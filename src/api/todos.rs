//! Todo API endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::{check_owner, message, success, ApiResult, MessageResult};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{CreateTodoRequest, Todo, UpdateTodoRequest};
use crate::AppState;

/// GET /api/todos/{ownerId} - List all todos, newest first.
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(owner_id): Path<i64>,
) -> ApiResult<Vec<Todo>> {
    check_owner(&auth, owner_id)?;
    success(state.repo.list_todos(owner_id).await?)
}

/// POST /api/todos - Create a new todo.
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateTodoRequest>,
) -> ApiResult<Todo> {
    let owner_id = request
        .owner_id
        .ok_or_else(|| AppError::Validation("ownerId and text are required".to_string()))?;
    let text = match request.text.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            return Err(AppError::Validation(
                "ownerId and text are required".to_string(),
            ))
        }
    };
    check_owner(&auth, owner_id)?;

    let todo_type = request.todo_type.as_deref().unwrap_or("personal");
    success(state.repo.create_todo(owner_id, &text, todo_type).await?)
}

/// PUT /api/todos/{id} - Partially update a todo.
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTodoRequest>,
) -> ApiResult<Todo> {
    success(state.repo.update_todo(auth.user_id, id, &request).await?)
}

/// DELETE /api/todos/{id} - Delete a todo.
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> MessageResult {
    state.repo.delete_todo(auth.user_id, id).await?;
    message("Todo deleted successfully")
}
