//! Product model for the catalog endpoints.

use serde::{Deserialize, Serialize};

use super::Patch;

/// A catalog product. Not owner-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Request body for partially updating a product. `description` and
/// `image_url` are nullable and distinguish absent from explicit null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Patch<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Query parameters for the product list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilters {
    #[serde(default)]
    pub category: Option<String>,
    /// Case-insensitive substring match against name or description.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}
