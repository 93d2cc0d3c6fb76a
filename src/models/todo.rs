//! Todo model: the original flat task list, kept alongside the richer items.

use serde::{Deserialize, Serialize};

/// A simple todo entry owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub todo_type: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new todo.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default, rename = "ownerId")]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "type")]
    pub todo_type: Option<String>,
}

/// Request body for partially updating a todo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "type")]
    pub todo_type: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}
