//! Route definitions for the Yerba Store Platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Product catalog
        .nest("/products", product_routes())
        // Orders (admin/manual entry + management)
        .nest("/orders", order_routes())
        // Storefront checkout
        .nest("/checkout", checkout_routes())
        // Inventory ledger
        .nest("/inventory", inventory_routes())
        // Customers
        .nest("/customers", customer_routes())
        // Admin dashboard
        .nest("/dashboard", dashboard_routes())
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product).put(handlers::update_product),
        )
        .route("/slug/:slug", get(handlers::get_product_by_slug))
}

/// Order management routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", put(handlers::update_order_status))
}

/// Storefront checkout routes
fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(handlers::create_checkout_order))
        .route("/validate-stock", post(handlers::validate_stock))
}

/// Inventory ledger routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        // Listing, stats (?type=stats), and low-stock alerts (?type=alerts)
        .route("/", get(handlers::get_inventory))
        // Movements
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        // Per-product balance and operations
        .route("/products/:product_id", get(handlers::get_product_inventory))
        .route("/products/:product_id/restock", post(handlers::restock_product))
        .route("/products/:product_id/reserve", post(handlers::reserve_stock))
        .route("/products/:product_id/release", post(handlers::release_stock))
}

/// Customer routes
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_customers))
        .route("/:customer_id", get(handlers::get_customer))
}

/// Admin dashboard routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(handlers::get_dashboard_metrics))
        .route("/movements/export", get(handlers::export_movements))
}
