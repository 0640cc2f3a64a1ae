//! HTTP handlers for storefront checkout endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::orders::CreateOrderResponse;
use crate::services::inventory::{StockValidationItem, StockValidationResult};
use crate::services::order::{CreateOrderInput, OrderOrigin};
use crate::services::{InventoryService, OrderService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateStockInput {
    pub items: Vec<StockValidationItem>,
}

#[derive(Debug, Serialize)]
pub struct ValidateStockResponse {
    pub success: bool,
    pub results: Vec<StockValidationResult>,
    pub message: String,
}

/// Create an order from the storefront checkout
///
/// Checkout orders start `pending` until the shop confirms payment.
pub async fn create_checkout_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<CreateOrderResponse>> {
    let service = OrderService::new(state.db);
    let order = service.create_order(input, OrderOrigin::Checkout).await?;
    Ok(Json(order.into()))
}

/// Pre-check cart lines against available stock
///
/// Advisory only: nothing is reserved, and the authoritative check happens
/// inside the order-creation transaction.
pub async fn validate_stock(
    State(state): State<AppState>,
    Json(input): Json<ValidateStockInput>,
) -> AppResult<Json<ValidateStockResponse>> {
    if input.items.is_empty() {
        return Err(AppError::Validation {
            field: "items".to_string(),
            message: "No items to validate".to_string(),
            message_es: "No hay items para validar".to_string(),
        });
    }

    let service = InventoryService::new(state.db);
    let results = service.validate_stock(&input.items).await?;

    let success = results.iter().all(|r| r.is_valid);
    let message = if success {
        "Stock available for all products".to_string()
    } else {
        "Some products do not have enough stock".to_string()
    };

    Ok(Json(ValidateStockResponse {
        success,
        results,
        message,
    }))
}
