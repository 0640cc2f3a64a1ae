//! HTTP handlers for order management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::OrderStatus;
use crate::services::order::{CreateOrderInput, Order, OrderOrigin, OrderWithItems};
use crate::services::OrderService;
use crate::AppState;

/// Response for order creation
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: OrderSummary,
}

/// The slice of an order the storefront needs after checkout
#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub total: Decimal,
    pub status: String,
}

impl From<Order> for CreateOrderResponse {
    fn from(order: Order) -> Self {
        Self {
            success: true,
            order: OrderSummary {
                id: order.id,
                order_number: order.order_number,
                total: order.total,
                status: order.status,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: String,
}

/// Create an order entered manually from the admin dashboard
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<CreateOrderResponse>> {
    let service = OrderService::new(state.db);
    let order = service.create_order(input, OrderOrigin::Manual).await?;
    Ok(Json(order.into()))
}

/// List orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    let orders = service.list_orders(query.limit.unwrap_or(50)).await?;
    Ok(Json(orders))
}

/// Get an order with its line items
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Change an order's status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<Json<Order>> {
    let status = OrderStatus::from_str(&input.status)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown status '{}'", input.status)))?;

    let service = OrderService::new(state.db);
    let order = service.update_status(order_id, status).await?;
    Ok(Json(order))
}
