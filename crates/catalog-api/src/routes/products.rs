//! 상품 endpoint.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use catalog_core::{ListQuery, NewProduct, Product, ProductPatch};
use std::sync::Arc;

use super::MessageResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.products.list(query).await?))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.products.get(id).await?))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.products.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.products.update(id, patch).await?))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.products.delete(id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

/// 인증된 사용자용 상품 라우터.
pub fn products_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product).put(update_product))
}

/// 관리자 전용 상품 라우터.
pub fn admin_products_router() -> Router<Arc<AppState>> {
    Router::new().route("/products/{id}", delete(delete_product))
}
