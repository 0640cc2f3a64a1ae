//! Stock ledger service: the single authority for inventory balances
//!
//! Every mutation of `stock_kg`/`reserved_kg`/`available_kg` goes through
//! this service. Balance updates and their movement-log append happen in
//! one transaction, with the inventory row locked (`FOR UPDATE`) so the
//! check-then-write is atomic against concurrent writers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{line_total_kg, MovementType, StockLevels};

use crate::error::{AppError, AppResult};

/// Inventory service for stock balances, movements, and alerts
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Inventory record joined with its product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub brand: Option<String>,
    pub stock_kg: Decimal,
    pub reserved_kg: Decimal,
    pub available_kg: Decimal,
    pub min_stock_kg: Decimal,
    pub max_stock_kg: Decimal,
    pub cost_per_kg: Option<Decimal>,
    pub last_restocked: Option<DateTime<Utc>>,
    pub location: String,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable stock movement
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type: String,
    pub quantity_kg: Decimal,
    pub previous_stock_kg: Decimal,
    pub new_stock_kg: Decimal,
    pub reason: String,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for adjusting stock by a signed delta
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustStockInput {
    pub product_id: Uuid,
    /// Signed delta in kilograms: positive adds stock, negative removes it
    pub quantity_kg: Decimal,
    pub movement_type: MovementType,
    pub reason: String,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Outcome of a stock adjustment
#[derive(Debug, Clone, Serialize)]
pub struct StockAdjustment {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity_kg: Decimal,
    pub previous_stock_kg: Decimal,
    pub new_stock_kg: Decimal,
    pub available_kg: Decimal,
}

/// Outcome of a reserve/release operation
#[derive(Debug, Clone, Serialize)]
pub struct ReservationChange {
    pub product_id: Uuid,
    pub stock_kg: Decimal,
    pub reserved_kg: Decimal,
    pub available_kg: Decimal,
}

/// Aggregate inventory statistics for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct InventoryStats {
    pub total_with_stock: i64,
    pub total_out_of_stock: i64,
    pub total_low_stock: i64,
    pub total_value: Decimal,
    pub total_stock_kg: Decimal,
}

/// Filter for movement history queries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

/// One cart line to validate against available stock
#[derive(Debug, Clone, Deserialize)]
pub struct StockValidationItem {
    pub product_id: Uuid,
    pub size_kg: Decimal,
    pub quantity: i32,
}

/// Per-item result of a stock validation pre-check
#[derive(Debug, Clone, Serialize)]
pub struct StockValidationResult {
    pub product_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub size_kg: Decimal,
    pub quantity: i32,
    pub total_kg_needed: Decimal,
    pub available_kg: Decimal,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Adjust stock by a signed delta, appending one movement row
    pub async fn adjust_stock(&self, input: AdjustStockInput) -> AppResult<StockAdjustment> {
        if input.quantity_kg == Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity_kg".to_string(),
                message: "Delta cannot be zero".to_string(),
                message_es: "El delta no puede ser cero".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;
        let adjustment = Self::adjust_stock_in_tx(&mut tx, &input).await?;
        tx.commit().await?;

        Ok(adjustment)
    }

    /// Adjust stock inside an existing transaction
    ///
    /// Used directly by the order writer so line-item decrements share the
    /// order's transaction. Locks the inventory row, enforces
    /// non-negativity, persists the new balance and the movement snapshot.
    pub(crate) async fn adjust_stock_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        input: &AdjustStockInput,
    ) -> AppResult<StockAdjustment> {
        let row = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT stock_kg, reserved_kg FROM inventory WHERE product_id = $1 FOR UPDATE",
        )
        .bind(input.product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory".to_string()))?;

        let levels = StockLevels::new(row.0, row.1);
        let updated = levels
            .apply(input.quantity_kg)
            .map_err(|e| AppError::from_stock_level(input.product_id, e))?;

        let restocked = input.movement_type == MovementType::In;
        sqlx::query(
            r#"
            UPDATE inventory
            SET stock_kg = $1, available_kg = $2,
                last_restocked = CASE WHEN $3 THEN now() ELSE last_restocked END,
                updated_at = now()
            WHERE product_id = $4
            "#,
        )
        .bind(updated.stock_kg)
        .bind(updated.available_kg)
        .bind(restocked)
        .bind(input.product_id)
        .execute(&mut **tx)
        .await?;

        Self::record_movement_in_tx(tx, input, levels.stock_kg, updated.stock_kg).await?;

        Ok(StockAdjustment {
            product_id: input.product_id,
            movement_type: input.movement_type,
            quantity_kg: input.quantity_kg,
            previous_stock_kg: levels.stock_kg,
            new_stock_kg: updated.stock_kg,
            available_kg: updated.available_kg,
        })
    }

    /// Append the audit row for a balance change
    ///
    /// Movements are append-only; nothing in the codebase updates or
    /// deletes them.
    async fn record_movement_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        input: &AdjustStockInput,
        previous_stock_kg: Decimal,
        new_stock_kg: Decimal,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                product_id, type, quantity_kg, previous_stock_kg, new_stock_kg,
                reason, reference_id, reference_type, notes, created_by
            )
            VALUES ($1, $2::stock_movement_type, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(input.product_id)
        .bind(input.movement_type.as_str())
        .bind(input.quantity_kg)
        .bind(previous_stock_kg)
        .bind(new_stock_kg)
        .bind(&input.reason)
        .bind(input.reference_id)
        .bind(&input.reference_type)
        .bind(&input.notes)
        .bind(input.created_by)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Reserve kilograms against a product's stock
    pub async fn reserve_stock(
        &self,
        product_id: Uuid,
        quantity_kg: Decimal,
        reference_id: Option<Uuid>,
    ) -> AppResult<ReservationChange> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT stock_kg, reserved_kg FROM inventory WHERE product_id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory".to_string()))?;

        let updated = StockLevels::new(row.0, row.1)
            .reserve(quantity_kg)
            .map_err(|e| AppError::from_stock_level(product_id, e))?;

        Self::persist_reservation(&mut tx, product_id, &updated).await?;
        tx.commit().await?;

        tracing::debug!(%product_id, %quantity_kg, ?reference_id, "Stock reserved");

        Ok(ReservationChange {
            product_id,
            stock_kg: updated.stock_kg,
            reserved_kg: updated.reserved_kg,
            available_kg: updated.available_kg,
        })
    }

    /// Release previously reserved kilograms (clamped at zero)
    pub async fn release_stock(
        &self,
        product_id: Uuid,
        quantity_kg: Decimal,
        reference_id: Option<Uuid>,
    ) -> AppResult<ReservationChange> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT stock_kg, reserved_kg FROM inventory WHERE product_id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory".to_string()))?;

        let updated = StockLevels::new(row.0, row.1)
            .release(quantity_kg)
            .map_err(|e| AppError::from_stock_level(product_id, e))?;

        Self::persist_reservation(&mut tx, product_id, &updated).await?;
        tx.commit().await?;

        tracing::debug!(%product_id, %quantity_kg, ?reference_id, "Stock released");

        Ok(ReservationChange {
            product_id,
            stock_kg: updated.stock_kg,
            reserved_kg: updated.reserved_kg,
            available_kg: updated.available_kg,
        })
    }

    async fn persist_reservation(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        levels: &StockLevels,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE inventory SET reserved_kg = $1, available_kg = $2, updated_at = now() WHERE product_id = $3",
        )
        .bind(levels.reserved_kg)
        .bind(levels.available_kg)
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Add stock from a restock delivery
    pub async fn restock(
        &self,
        product_id: Uuid,
        quantity_kg: Decimal,
        reason: Option<String>,
        notes: Option<String>,
        created_by: Option<Uuid>,
    ) -> AppResult<StockAdjustment> {
        if quantity_kg <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity_kg".to_string(),
                message: "Restock quantity must be positive".to_string(),
                message_es: "La cantidad de reposición debe ser positiva".to_string(),
            });
        }

        self.adjust_stock(AdjustStockInput {
            product_id,
            quantity_kg,
            movement_type: MovementType::In,
            reason: reason.unwrap_or_else(|| "Restock".to_string()),
            reference_id: None,
            reference_type: Some("restock".to_string()),
            notes,
            created_by,
        })
        .await
    }

    /// Get the inventory record for a product
    pub async fn get_by_product(&self, product_id: Uuid) -> AppResult<InventoryItem> {
        sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT i.id, i.product_id, p.name AS product_name, p.brand,
                   i.stock_kg, i.reserved_kg, i.available_kg, i.min_stock_kg, i.max_stock_kg,
                   i.cost_per_kg, i.last_restocked, i.location, i.notes, i.updated_at
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory".to_string()))
    }

    /// List all inventory records with their products
    pub async fn list_inventory(&self) -> AppResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT i.id, i.product_id, p.name AS product_name, p.brand,
                   i.stock_kg, i.reserved_kg, i.available_kg, i.min_stock_kg, i.max_stock_kg,
                   i.cost_per_kg, i.last_restocked, i.location, i.notes, i.updated_at
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// Products at or below their minimum stock threshold, lowest first
    pub async fn list_low_stock(&self) -> AppResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT i.id, i.product_id, p.name AS product_name, p.brand,
                   i.stock_kg, i.reserved_kg, i.available_kg, i.min_stock_kg, i.max_stock_kg,
                   i.cost_per_kg, i.last_restocked, i.location, i.notes, i.updated_at
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.stock_kg <= i.min_stock_kg
            ORDER BY i.stock_kg ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// Products with nothing on hand
    pub async fn list_out_of_stock(&self) -> AppResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT i.id, i.product_id, p.name AS product_name, p.brand,
                   i.stock_kg, i.reserved_kg, i.available_kg, i.min_stock_kg, i.max_stock_kg,
                   i.cost_per_kg, i.last_restocked, i.location, i.notes, i.updated_at
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.stock_kg = 0
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// Aggregate inventory statistics
    pub async fn get_stats(&self) -> AppResult<InventoryStats> {
        let row = sqlx::query_as::<_, (i64, i64, i64, Decimal, Decimal)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE stock_kg > 0),
                COUNT(*) FILTER (WHERE stock_kg = 0),
                COUNT(*) FILTER (WHERE stock_kg <= min_stock_kg),
                COALESCE(SUM(stock_kg * COALESCE(cost_per_kg, 0)), 0),
                COALESCE(SUM(stock_kg), 0)
            FROM inventory
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(InventoryStats {
            total_with_stock: row.0,
            total_out_of_stock: row.1,
            total_low_stock: row.2,
            total_value: row.3,
            total_stock_kg: row.4,
        })
    }

    /// Movement history, newest first
    pub async fn list_movements(&self, filter: MovementFilter) -> AppResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, type::text AS movement_type, quantity_kg,
                   previous_stock_kg, new_stock_kg, reason, reference_id, reference_type,
                   notes, created_by, created_at
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::date IS NULL OR created_at >= $2::date)
              AND ($3::date IS NULL OR created_at < $3::date + INTERVAL '1 day')
            ORDER BY created_at DESC
            LIMIT $4
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.limit.unwrap_or(100))
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Non-mutating pre-check of cart lines against available stock
    ///
    /// Does not reserve anything; a race between this check and order
    /// creation is resolved only by the order transaction's own check.
    pub async fn validate_stock(
        &self,
        items: &[StockValidationItem],
    ) -> AppResult<Vec<StockValidationResult>> {
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            let record = sqlx::query_as::<_, (String, Decimal)>(
                r#"
                SELECT p.name, i.available_kg
                FROM inventory i
                JOIN products p ON p.id = i.product_id
                WHERE i.product_id = $1
                "#,
            )
            .bind(item.product_id)
            .fetch_optional(&self.db)
            .await?;

            let total_kg_needed = line_total_kg(item.size_kg, item.quantity);

            match record {
                None => results.push(StockValidationResult {
                    product_id: item.product_id,
                    product_name: None,
                    size_kg: item.size_kg,
                    quantity: item.quantity,
                    total_kg_needed,
                    available_kg: Decimal::ZERO,
                    is_valid: false,
                    error: Some("Product not found".to_string()),
                }),
                Some((name, available_kg)) => {
                    let is_valid = total_kg_needed <= available_kg;
                    results.push(StockValidationResult {
                        product_id: item.product_id,
                        product_name: Some(name),
                        size_kg: item.size_kg,
                        quantity: item.quantity,
                        total_kg_needed,
                        available_kg,
                        is_valid,
                        error: (!is_valid).then(|| {
                            format!(
                                "Insufficient stock: available {} kg, needed {} kg",
                                available_kg, total_kg_needed
                            )
                        }),
                    });
                }
            }
        }

        Ok(results)
    }
}
