//! HTTP handlers for admin dashboard endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::services::dashboard::DashboardMetrics;
use crate::services::inventory::MovementFilter;
use crate::services::{DashboardService, InventoryService};
use crate::AppState;

/// Headline metrics for the admin dashboard
pub async fn get_dashboard_metrics(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardMetrics>> {
    let service = DashboardService::new(state.db);
    let metrics = service.get_metrics().await?;
    Ok(Json(metrics))
}

/// Download the movement history as CSV
pub async fn export_movements(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<impl IntoResponse> {
    let service = InventoryService::new(state.db);
    let movements = service.list_movements(filter).await?;
    let csv_data = DashboardService::export_to_csv(&movements)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"stock-movements.csv\"",
            ),
        ],
        csv_data,
    ))
}
