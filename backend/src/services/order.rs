//! Order writer service
//!
//! Creates an order aggregate (header + line items), decrements stock for
//! every line through the ledger, and updates customer statistics, all
//! inside one transaction. If any line fails the stock check, everything
//! rolls back: no partial order, no partial decrement, no stat update.

use chrono::{DateTime, Local, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{
    compute_order_totals, format_order_number, line_total_kg, MovementType, OrderStatus,
    SaleChannel, ShippingAddress,
};
use shared::validation::validate_package_size;

use crate::error::{AppError, AppResult};
use crate::services::customer::{CustomerContact, CustomerService};
use crate::services::inventory::{AdjustStockInput, InventoryService};

/// Order service for creation, lookup, and status changes
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Where an order entered the system
///
/// Admin-entered sales go out confirmed and paid on the spot; storefront
/// checkouts stay pending until the shop confirms payment. The two initial
/// states are intentionally different.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOrigin {
    Manual,
    Checkout,
}

/// One ordered line
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub product_name: String,
    pub size_kg: Decimal,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Input for creating an order
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub channel: Option<SaleChannel>,
    pub payment_method: Option<String>,
    pub items: Vec<OrderItemInput>,
    pub shipping_address: Option<ShippingAddress>,
    pub shipping_cost: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub notes: Option<String>,
}

/// An order header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status: String,
    pub channel: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub shipping_address: sqlx::types::Json<ShippingAddress>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// An order line item
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub size_kg: Decimal,
    pub quantity: i32,
    pub total_kg: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Order header with its line items
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

const ORDER_COLUMNS: &str = "id, order_number, customer_id, status::text AS status, \
     channel::text AS channel, customer_name, customer_email, customer_phone, \
     shipping_address, subtotal, shipping_cost, discount, total, payment_method, \
     payment_status, notes, created_at, updated_at, confirmed_at, shipped_at, \
     delivered_at, cancelled_at";

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order, decrementing stock for every line item
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
        origin: OrderOrigin,
    ) -> AppResult<Order> {
        let contact = CustomerContact {
            full_name: input.customer_name.clone(),
            phone: input.customer_phone.clone(),
            email: input.customer_email.clone(),
        };
        CustomerService::validate_contact(&contact)?;
        Self::validate_items(&input.items)?;

        let channel = input.channel.unwrap_or(match origin {
            OrderOrigin::Manual => SaleChannel::Presencial,
            OrderOrigin::Checkout => SaleChannel::Online,
        });
        let payment_method = input
            .payment_method
            .clone()
            .unwrap_or_else(|| "efectivo".to_string());
        let shipping_address = input
            .shipping_address
            .clone()
            .unwrap_or_else(ShippingAddress::pickup);

        let totals = compute_order_totals(
            input.items.iter().map(|i| (i.unit_price, i.quantity)),
            input.shipping_cost.unwrap_or(Decimal::ZERO),
            input.discount.unwrap_or(Decimal::ZERO),
        );

        let (status, payment_status) = match origin {
            OrderOrigin::Manual => (OrderStatus::Confirmed, "paid"),
            OrderOrigin::Checkout => (OrderStatus::Pending, "pending"),
        };

        let mut tx = self.db.begin().await?;

        let customer = CustomerService::find_or_create_in_tx(&mut tx, &contact).await?;
        let order_number = Self::generate_order_number(&mut tx).await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (
                order_number, customer_id, status, channel,
                customer_name, customer_email, customer_phone, shipping_address,
                subtotal, shipping_cost, discount, total,
                payment_method, payment_status, notes, confirmed_at
            )
            VALUES ($1, $2, $3::order_status, $4::sale_channel, $5, $6, $7, $8,
                    $9, $10, $11, $12, $13, $14, $15,
                    CASE WHEN $3 = 'confirmed' THEN now() ELSE NULL END)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&order_number)
        .bind(customer.id)
        .bind(status.as_str())
        .bind(channel.as_str())
        .bind(&input.customer_name)
        .bind(&input.customer_email)
        .bind(&input.customer_phone)
        .bind(sqlx::types::Json(&shipping_address))
        .bind(totals.subtotal)
        .bind(totals.shipping_cost)
        .bind(totals.discount)
        .bind(totals.total)
        .bind(&payment_method)
        .bind(payment_status)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for item in &input.items {
            let total_kg = line_total_kg(item.size_kg, item.quantity);

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, product_id, product_name, size_kg, quantity,
                    total_kg, unit_price, total_price
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.size_kg)
            .bind(item.quantity)
            .bind(total_kg)
            .bind(item.unit_price)
            .bind(item.unit_price * Decimal::from(item.quantity))
            .execute(&mut *tx)
            .await?;

            // Ledger decrement shares the order transaction; an
            // insufficient-stock failure here rolls everything back.
            InventoryService::adjust_stock_in_tx(
                &mut tx,
                &AdjustStockInput {
                    product_id: item.product_id,
                    quantity_kg: -total_kg,
                    movement_type: MovementType::Out,
                    reason: format!("{} sale - order {}", channel, order_number),
                    reference_id: Some(order.id),
                    reference_type: Some("order".to_string()),
                    notes: Some(format!(
                        "{} × {} kg = {} kg of {}",
                        item.quantity, item.size_kg, total_kg, item.product_name
                    )),
                    created_by: None,
                },
            )
            .await?;
        }

        CustomerService::record_order_in_tx(&mut tx, customer.id, totals.total).await?;

        tx.commit().await?;

        tracing::info!(
            order_number = %order.order_number,
            total = %order.total,
            items = input.items.len(),
            "Order created"
        );

        Ok(order)
    }

    fn validate_items(items: &[OrderItemInput]) -> AppResult<()> {
        if items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Order must include at least one item".to_string(),
                message_es: "El pedido debe incluir al menos un producto".to_string(),
            });
        }
        for item in items {
            if item.quantity < 1 {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Item quantity must be at least 1".to_string(),
                    message_es: "La cantidad debe ser al menos 1".to_string(),
                });
            }
            if let Err(msg) = validate_package_size(item.size_kg) {
                return Err(AppError::Validation {
                    field: "size_kg".to_string(),
                    message: msg.to_string(),
                    message_es: format!("Tamaño de paquete inválido: {} kg", item.size_kg),
                });
            }
            if item.unit_price < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "unit_price".to_string(),
                    message: "Unit price cannot be negative".to_string(),
                    message_es: "El precio unitario no puede ser negativo".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Generate the next order number for today
    ///
    /// `ORD-YYYYMMDD-NNNN`: local date plus a per-day sequence derived from
    /// the number of orders created since local midnight.
    async fn generate_order_number(tx: &mut Transaction<'_, Postgres>) -> AppResult<String> {
        let now_local = Local::now();
        let today = now_local.date_naive();

        let midnight_utc = today
            .and_time(NaiveTime::MIN)
            .and_local_timezone(Local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| AppError::Internal("Could not resolve local midnight".to_string()))?;

        let todays_orders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE created_at >= $1")
                .bind(midnight_utc)
                .fetch_one(&mut **tx)
                .await?;

        Ok(format_order_number(today, (todays_orders + 1) as u32))
    }

    /// Get an order with its line items
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderWithItems> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, product_name, size_kg, quantity,
                   total_kg, unit_price, total_price, created_at
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderWithItems { order, items })
    }

    /// List orders, newest first
    pub async fn list_orders(&self, limit: i64) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Change an order's status from the admin dashboard
    ///
    /// `delivered` and `cancelled` are absorbing. Cancelling does not
    /// restore stock; a compensating adjustment is recorded manually when
    /// the shop actually takes the goods back.
    pub async fn update_status(&self, order_id: Uuid, new_status: OrderStatus) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;

        let current: String =
            sqlx::query_scalar("SELECT status::text FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let current_status = OrderStatus::from_str(&current)
            .ok_or_else(|| AppError::Internal(format!("Unknown order status '{}'", current)))?;

        if current_status.is_terminal() {
            return Err(AppError::InvalidStateTransition(format!(
                "Order is already {}",
                current_status
            )));
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET status = $1::order_status,
                confirmed_at = CASE WHEN $1 = 'confirmed' THEN now() ELSE confirmed_at END,
                shipped_at = CASE WHEN $1 = 'shipped' THEN now() ELSE shipped_at END,
                delivered_at = CASE WHEN $1 = 'delivered' THEN now() ELSE delivered_at END,
                cancelled_at = CASE WHEN $1 = 'cancelled' THEN now() ELSE cancelled_at END,
                updated_at = now()
            WHERE id = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(new_status.as_str())
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(order)
    }
}
