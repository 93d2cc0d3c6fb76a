//! Product API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{message, success, ApiResult, MessageResult};
use crate::errors::AppError;
use crate::models::{CreateProductRequest, Product, ProductFilters, UpdateProductRequest};
use crate::AppState;

/// GET /api/products - List products with optional filters.
pub async fn list_products(
    State(state): State<AppState>,
    Query(filters): Query<ProductFilters>,
) -> ApiResult<Vec<Product>> {
    success(
        state
            .repo
            .list_products(
                filters.category.as_deref(),
                filters.search.as_deref(),
                filters.is_active,
            )
            .await?,
    )
}

/// GET /api/products/{id} - Get a single product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Product> {
    match state.repo.get_product(id).await? {
        Some(product) => success(product),
        None => Err(AppError::NotFound(format!("Product {} not found", id))),
    }
}

/// POST /api/products - Create a new product.
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<Product> {
    let name = match request.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => {
            return Err(AppError::Validation(
                "Name and price are required".to_string(),
            ))
        }
    };
    let price = request
        .price
        .ok_or_else(|| AppError::Validation("Name and price are required".to_string()))?;

    success(state.repo.create_product(&name, price, &request).await?)
}

/// PUT /api/products/{id} - Partially update a product.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<Product> {
    success(state.repo.update_product(id, &request).await?)
}

/// DELETE /api/products/{id} - Delete a product.
pub async fn delete_product(State(state): State<AppState>, Path(id): Path<i64>) -> MessageResult {
    state.repo.delete_product(id).await?;
    message("Product deleted successfully")
}
