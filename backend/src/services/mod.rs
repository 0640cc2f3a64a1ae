//! Business logic services for the Yerba Store Platform

pub mod customer;
pub mod dashboard;
pub mod inventory;
pub mod order;
pub mod product;

pub use customer::CustomerService;
pub use dashboard::DashboardService;
pub use inventory::InventoryService;
pub use order::OrderService;
pub use product::ProductService;
