use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use larder_catalog::{Product, Stock};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    /// Signed delta in whole boxes
    #[serde(default)]
    pub boxes: i32,
    /// Signed delta in loose units
    #[serde(default)]
    pub units: i32,
}

#[derive(Debug, Deserialize)]
pub struct MinStockRequest {
    pub min_stock: i32,
}

/// GET /products/{id}/stock
pub async fn get_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Stock>, ApiError> {
    Ok(Json(state.repo.get_stock(&id).await?))
}

/// POST /products/{id}/stock/adjust
/// Apply signed deltas and return the stock as it stands afterwards
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<Stock>, ApiError> {
    let stock = state.repo.adjust_stock(&id, req.boxes, req.units).await?;
    Ok(Json(stock))
}

/// PUT /products/{id}/stock/min
pub async fn set_min_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MinStockRequest>,
) -> Result<StatusCode, ApiError> {
    state.repo.set_min_stock(&id, req.min_stock).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /stock/low
/// Active products under their alert threshold
pub async fn low_stock(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.repo.low_stock_products().await?))
}
