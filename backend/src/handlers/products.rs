//! HTTP handlers for product catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::product::{CreateProductInput, ProductRecord, UpdateProductInput};
use crate::services::ProductService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Include inactive and draft products (admin views)
    pub all: Option<bool>,
}

/// List products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<Vec<ProductRecord>>> {
    let service = ProductService::new(state.db);
    let products = service
        .list_products(!query.all.unwrap_or(false))
        .await?;
    Ok(Json(products))
}

/// Create a product (and its empty inventory record)
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// Get a product by id
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Get a product by slug (storefront URLs)
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db);
    let product = service.get_by_slug(&slug).await?;
    Ok(Json(product))
}

/// Partially update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db);
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}
