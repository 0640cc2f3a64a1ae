//! HTTP handlers for customer endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::customer::Customer;
use crate::services::CustomerService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    pub limit: Option<i64>,
}

/// List customers, most recent buyers first
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerListQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let service = CustomerService::new(state.db);
    let customers = service.list_customers(query.limit.unwrap_or(50)).await?;
    Ok(Json(customers))
}

/// Get a customer by id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.get_customer(customer_id).await?;
    Ok(Json(customer))
}
