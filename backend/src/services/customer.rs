//! Customer lookup and statistics service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::CustomerType;
use shared::validation::validate_email;

use crate::error::{AppError, AppResult};

/// Customer service for lookups and order statistics
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// A customer record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub customer_type: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub full_name: String,
    pub is_active: bool,
    pub loyalty_points: i32,
    pub loyalty_tier: String,
    pub total_orders: i32,
    pub total_spent: Decimal,
    pub last_order_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact details used to resolve or create a customer
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerContact {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
}

const CUSTOMER_COLUMNS: &str = "id, customer_type::text AS customer_type, email, phone, full_name, \
     is_active, loyalty_points, loyalty_tier, total_orders, total_spent, last_order_date, \
     notes, created_at, updated_at";

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve a customer by email, then phone; create a guest when absent
    ///
    /// Runs inside the caller's transaction so order creation and customer
    /// creation commit or roll back together.
    pub(crate) async fn find_or_create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        contact: &CustomerContact,
    ) -> AppResult<Customer> {
        if let Some(email) = contact.email.as_deref() {
            let found = sqlx::query_as::<_, Customer>(&format!(
                "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(&mut **tx)
            .await?;

            if let Some(customer) = found {
                return Ok(customer);
            }
        }

        let found = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = $1"
        ))
        .bind(&contact.phone)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(customer) = found {
            return Ok(customer);
        }

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (customer_type, email, phone, full_name, is_active)
            VALUES ($1::customer_type, $2, $3, $4, true)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(CustomerType::Guest.as_str())
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.full_name)
        .fetch_one(&mut **tx)
        .await?;

        Ok(customer)
    }

    /// Increment order statistics after a committed sale
    ///
    /// Runs inside the order transaction so the stats move with the order
    /// or not at all.
    pub(crate) async fn record_order_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        customer_id: Uuid,
        order_total: Decimal,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE customers
            SET total_orders = total_orders + 1,
                total_spent = total_spent + $1,
                last_order_date = now(),
                updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(order_total)
        .bind(customer_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Validate contact details before order creation
    pub fn validate_contact(contact: &CustomerContact) -> AppResult<()> {
        if contact.full_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "customer_name".to_string(),
                message: "Customer name is required".to_string(),
                message_es: "El nombre del cliente es obligatorio".to_string(),
            });
        }
        if contact.phone.trim().is_empty() {
            return Err(AppError::Validation {
                field: "customer_phone".to_string(),
                message: "Customer phone is required".to_string(),
                message_es: "El teléfono del cliente es obligatorio".to_string(),
            });
        }
        if let Some(email) = contact.email.as_deref() {
            if validate_email(email).is_err() {
                return Err(AppError::Validation {
                    field: "customer_email".to_string(),
                    message: "Invalid email format".to_string(),
                    message_es: "Formato de email inválido".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get a customer by id
    pub async fn get_customer(&self, customer_id: Uuid) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// List customers, most recent buyers first
    pub async fn list_customers(&self, limit: i64) -> AppResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            ORDER BY last_order_date DESC NULLS LAST, created_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(customers)
    }
}
