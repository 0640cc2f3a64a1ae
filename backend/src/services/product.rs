//! Product catalog service
//!
//! Products are never hard-deleted; they are deactivated. Every product is
//! created together with its zero-stock inventory row, so the ledger has a
//! row to lock from the product's first day.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use shared::models::{PricesPerKg, ProductStatus};
use shared::validation::{validate_package_size, validate_slug};

use crate::error::{AppError, AppResult};

/// Product service for the catalog
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// A product with its category and stock levels
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub brand: Option<String>,
    pub origin: Option<String>,
    pub product_type: Option<String>,
    pub tags: Json<Vec<String>>,
    pub status: String,
    pub is_featured: bool,
    pub prices_per_kg: Json<PricesPerKg>,
    pub available_sizes: Json<Vec<Decimal>>,
    pub stock_kg: Option<Decimal>,
    pub available_kg: Option<Decimal>,
    pub reserved_kg: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub category_id: Uuid,
    pub brand: Option<String>,
    pub origin: Option<String>,
    pub product_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ProductStatus>,
    pub is_featured: Option<bool>,
    pub prices_per_kg: PricesPerKg,
    pub available_sizes: Vec<Decimal>,
    pub min_stock_kg: Option<Decimal>,
    pub max_stock_kg: Option<Decimal>,
    pub cost_per_kg: Option<Decimal>,
    pub location: Option<String>,
}

/// Input for updating a product (all fields optional)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub brand: Option<String>,
    pub origin: Option<String>,
    pub product_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ProductStatus>,
    pub is_featured: Option<bool>,
    pub prices_per_kg: Option<PricesPerKg>,
    pub available_sizes: Option<Vec<Decimal>>,
}

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.slug, p.description, p.long_description, \
     p.category_id, c.name AS category_name, p.brand, p.origin, p.type AS product_type, \
     p.tags, p.status::text AS status, p.is_featured, p.prices_per_kg, p.available_sizes, \
     i.stock_kg, i.available_kg, i.reserved_kg, p.created_at, p.updated_at";

const PRODUCT_JOINS: &str = "FROM products p \
     LEFT JOIN categories c ON c.id = p.category_id \
     LEFT JOIN inventory i ON i.product_id = p.id";

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product together with its zero-stock inventory record
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<ProductRecord> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name cannot be empty".to_string(),
                message_es: "El nombre del producto no puede estar vacío".to_string(),
            });
        }
        if let Err(msg) = validate_slug(&input.slug) {
            return Err(AppError::Validation {
                field: "slug".to_string(),
                message: msg.to_string(),
                message_es: format!("Slug inválido: {}", input.slug),
            });
        }
        for size in &input.available_sizes {
            if let Err(msg) = validate_package_size(*size) {
                return Err(AppError::Validation {
                    field: "available_sizes".to_string(),
                    message: msg.to_string(),
                    message_es: format!("Tamaño de paquete inválido: {} kg", size),
                });
            }
        }

        let slug_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1)",
        )
        .bind(&input.slug)
        .fetch_one(&self.db)
        .await?;

        if slug_taken {
            return Err(AppError::DuplicateEntry("slug".to_string()));
        }

        let status = input.status.unwrap_or(ProductStatus::Draft);

        let mut tx = self.db.begin().await?;

        let product_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (
                name, slug, description, long_description, category_id, brand,
                origin, type, tags, status, is_featured, prices_per_kg, available_sizes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::product_status, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.long_description)
        .bind(input.category_id)
        .bind(&input.brand)
        .bind(&input.origin)
        .bind(&input.product_type)
        .bind(Json(input.tags.clone().unwrap_or_default()))
        .bind(status.as_str())
        .bind(input.is_featured.unwrap_or(false))
        .bind(Json(&input.prices_per_kg))
        .bind(Json(&input.available_sizes))
        .fetch_one(&mut *tx)
        .await?;

        // Inventory exists from birth, with nothing on hand yet
        sqlx::query(
            r#"
            INSERT INTO inventory (
                product_id, stock_kg, reserved_kg, available_kg,
                min_stock_kg, max_stock_kg, cost_per_kg, location
            )
            VALUES ($1, 0, 0, 0, $2, $3, $4, $5)
            "#,
        )
        .bind(product_id)
        .bind(input.min_stock_kg.unwrap_or(Decimal::from(5)))
        .bind(input.max_stock_kg.unwrap_or(Decimal::from(200)))
        .bind(input.cost_per_kg)
        .bind(input.location.unwrap_or_else(|| "principal".to_string()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_product(product_id).await
    }

    /// Get a product by id
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<ProductRecord> {
        sqlx::query_as::<_, ProductRecord>(&format!(
            "SELECT {PRODUCT_COLUMNS} {PRODUCT_JOINS} WHERE p.id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Get a product by slug
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<ProductRecord> {
        sqlx::query_as::<_, ProductRecord>(&format!(
            "SELECT {PRODUCT_COLUMNS} {PRODUCT_JOINS} WHERE p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// List products, featured first then alphabetical
    pub async fn list_products(&self, active_only: bool) -> AppResult<Vec<ProductRecord>> {
        let products = sqlx::query_as::<_, ProductRecord>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} {PRODUCT_JOINS}
            WHERE ($1 = false OR p.status = 'active')
            ORDER BY p.is_featured DESC, p.name ASC
            "#
        ))
        .bind(active_only)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Partially update a product
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<ProductRecord> {
        if let Some(sizes) = &input.available_sizes {
            for size in sizes {
                if let Err(msg) = validate_package_size(*size) {
                    return Err(AppError::Validation {
                        field: "available_sizes".to_string(),
                        message: msg.to_string(),
                        message_es: format!("Tamaño de paquete inválido: {} kg", size),
                    });
                }
            }
        }

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE products
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                long_description = COALESCE($3, long_description),
                brand = COALESCE($4, brand),
                origin = COALESCE($5, origin),
                type = COALESCE($6, type),
                tags = COALESCE($7, tags),
                status = COALESCE($8::product_status, status),
                is_featured = COALESCE($9, is_featured),
                prices_per_kg = COALESCE($10, prices_per_kg),
                available_sizes = COALESCE($11, available_sizes),
                updated_at = now()
            WHERE id = $12
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.long_description)
        .bind(&input.brand)
        .bind(&input.origin)
        .bind(&input.product_type)
        .bind(input.tags.clone().map(Json))
        .bind(input.status.map(|s| s.as_str()))
        .bind(input.is_featured)
        .bind(input.prices_per_kg.clone().map(Json))
        .bind(input.available_sizes.clone().map(Json))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        self.get_product(updated).await
    }
}
