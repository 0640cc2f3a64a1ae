//! Dashboard service for admin metrics and data export

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// Headline metrics for the admin dashboard
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_products: i64,
    pub active_products: i64,
    pub orders_today: i64,
    pub revenue_today: Decimal,
    pub pending_orders: i64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
    pub total_stock_kg: Decimal,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Headline metrics in one pass per table
    pub async fn get_metrics(&self) -> AppResult<DashboardMetrics> {
        let products = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'active') FROM products",
        )
        .fetch_one(&self.db)
        .await?;

        let orders = sqlx::query_as::<_, (i64, Decimal, i64)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE created_at >= date_trunc('day', now())),
                COALESCE(SUM(total) FILTER (WHERE created_at >= date_trunc('day', now())), 0),
                COUNT(*) FILTER (WHERE status = 'pending')
            FROM orders
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let inventory = sqlx::query_as::<_, (i64, i64, Decimal)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE stock_kg <= min_stock_kg),
                COUNT(*) FILTER (WHERE stock_kg = 0),
                COALESCE(SUM(stock_kg), 0)
            FROM inventory
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            total_products: products.0,
            active_products: products.1,
            orders_today: orders.0,
            revenue_today: orders.1,
            pending_orders: orders.2,
            low_stock_count: inventory.0,
            out_of_stock_count: inventory.1,
            total_stock_kg: inventory.2,
        })
    }

    /// Serialize records to CSV for download
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);

        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
        }

        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("CSV encoding error: {}", e)))?;

        Ok(csv_data)
    }
}
