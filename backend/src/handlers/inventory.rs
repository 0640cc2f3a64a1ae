//! HTTP handlers for inventory management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::inventory::{
    AdjustStockInput, InventoryItem, MovementFilter, ReservationChange, StockAdjustment,
    StockMovement,
};
use crate::services::InventoryService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InventoryQuery {
    /// `stats` for aggregates, `alerts` for the low-stock list
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RestockInput {
    pub quantity_kg: Decimal,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationInput {
    pub quantity_kg: Decimal,
    pub reference_id: Option<Uuid>,
}

/// Inventory listing, stats, or low-stock alerts depending on `?type=`
pub async fn get_inventory(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let service = InventoryService::new(state.db);

    match query.kind.as_deref() {
        Some("stats") => {
            let stats = service.get_stats().await?;
            Ok(Json(json!({ "stats": stats, "success": true })))
        }
        Some("alerts") => {
            let alerts = service.list_low_stock().await?;
            Ok(Json(json!({ "alerts": alerts, "success": true })))
        }
        _ => {
            let inventory = service.list_inventory().await?;
            Ok(Json(json!({ "inventory": inventory, "success": true })))
        }
    }
}

/// Get the inventory record for a product
pub async fn get_product_inventory(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(state.db);
    let item = service.get_by_product(product_id).await?;
    Ok(Json(item))
}

/// Movement history, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = InventoryService::new(state.db);
    let movements = service.list_movements(filter).await?;
    Ok(Json(movements))
}

/// Record a manual stock adjustment
pub async fn record_movement(
    State(state): State<AppState>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<StockAdjustment>> {
    let service = InventoryService::new(state.db);
    let adjustment = service.adjust_stock(input).await?;
    Ok(Json(adjustment))
}

/// Add stock from a restock delivery
pub async fn restock_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<RestockInput>,
) -> AppResult<Json<StockAdjustment>> {
    let service = InventoryService::new(state.db);
    let adjustment = service
        .restock(
            product_id,
            input.quantity_kg,
            input.reason,
            input.notes,
            input.created_by,
        )
        .await?;
    Ok(Json(adjustment))
}

/// Reserve kilograms for a pending commitment
pub async fn reserve_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ReservationInput>,
) -> AppResult<Json<ReservationChange>> {
    let service = InventoryService::new(state.db);
    let change = service
        .reserve_stock(product_id, input.quantity_kg, input.reference_id)
        .await?;
    Ok(Json(change))
}

/// Release previously reserved kilograms
pub async fn release_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ReservationInput>,
) -> AppResult<Json<ReservationChange>> {
    let service = InventoryService::new(state.db);
    let change = service
        .release_stock(product_id, input.quantity_kg, input.reference_id)
        .await?;
    Ok(Json(change))
}
