//! Tag model: a named, colored label scoped to one owner.

use serde::{Deserialize, Serialize};

/// Color assigned to tags created without an explicit one.
pub const DEFAULT_TAG_COLOR: &str = "#6366f1";

/// A label attachable to items. `(user_id, name)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: String,
    pub created_at: String,
}

/// Request body for creating a new tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    #[serde(default, rename = "ownerId")]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Request body for updating an existing tag.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTagRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}
