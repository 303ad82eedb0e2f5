use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use larder_catalog::Product;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub size: i32,
    #[serde(default)]
    pub container_type: String,
    #[serde(default)]
    pub box_size: i32,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ProductInput {
    fn into_product(self) -> Result<Product, ApiError> {
        let mut product = Product::new(
            &self.name,
            &self.brand,
            self.size,
            &self.container_type,
            self.box_size,
            self.price,
            &self.category,
        )?;
        product.is_active = self.is_active;
        Ok(product)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /products
/// All active products, or a name/brand search when `?q=` is present
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = match query.q.as_deref() {
        Some(q) if !q.is_empty() => state.repo.search_products(q).await?,
        _ => state.repo.list_products().await?,
    };
    Ok(Json(products))
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let product = input.into_product()?;
    let id = state.repo.add_product(&product).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.repo.get_product(&id).await?))
}

/// PUT /products/{id}
/// Wholesale replacement of the stored record
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>, ApiError> {
    let mut product = input.into_product()?;
    product.id = id;
    state.repo.update_product(&product).await?;
    Ok(Json(product))
}

/// DELETE /products/{id}
/// Soft delete: the record stays queryable by id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.repo.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
