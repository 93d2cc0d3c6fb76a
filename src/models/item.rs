//! Item model: a unit of captured content (task, note, or thought).

use serde::{Deserialize, Serialize};

use super::{Patch, Tag};

/// Kind of content an item holds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Task,
    Note,
    Thought,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Task => "task",
            ItemType::Note => "note",
            ItemType::Thought => "thought",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "task" => Some(ItemType::Task),
            "note" => Some(ItemType::Note),
            "thought" => Some(ItemType::Thought),
            _ => None,
        }
    }
}

/// Priority level of an item. Stored as NULL when unset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A captured content item owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub item_type: ItemType,
    pub completed: bool,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub pinned: bool,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// An item enriched with its full tag set, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ItemWithTags {
    #[serde(flatten)]
    pub item: Item,
    pub tags: Vec<Tag>,
}

/// Request body for creating a new item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default, rename = "ownerId")]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub item_type: Option<ItemType>,
    /// Tag ids to associate with the new item.
    #[serde(default)]
    pub tags: Option<Vec<i64>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub pinned: Option<bool>,
}

/// Request body for partially updating an item.
///
/// `priority` and `due_date` are nullable columns, so they distinguish
/// "absent" from "explicitly null"; `tags`, when present (even empty),
/// replaces the full association set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub item_type: Option<ItemType>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Patch<Priority>,
    #[serde(default)]
    pub due_date: Patch<String>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<i64>>,
}

/// Resolved filter set for the item search endpoint. All conditions are ANDed.
#[derive(Debug, Clone, Default)]
pub struct ItemFilters {
    pub item_type: Option<ItemType>,
    pub completed: Option<bool>,
    pub archived: Option<bool>,
    pub pinned: Option<bool>,
    /// Item must carry at least one of these tags, if non-empty.
    pub tag_ids: Vec<i64>,
    /// Case-insensitive substring match against content.
    pub search: Option<String>,
}
