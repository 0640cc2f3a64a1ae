//! Order models and order arithmetic

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of an order
///
/// Orders advance `pending -> confirmed -> preparing -> shipped ->
/// delivered`; `cancelled` is an absorbing alternate state reachable from
/// any non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "preparing" => Some(OrderStatus::Preparing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sales channel an order came in through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleChannel {
    Online,
    Whatsapp,
    Instagram,
    Presencial,
}

impl SaleChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleChannel::Online => "online",
            SaleChannel::Whatsapp => "whatsapp",
            SaleChannel::Instagram => "instagram",
            SaleChannel::Presencial => "presencial",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "online" => Some(SaleChannel::Online),
            "whatsapp" => Some(SaleChannel::Whatsapp),
            "instagram" => Some(SaleChannel::Instagram),
            "presencial" => Some(SaleChannel::Presencial),
            _ => None,
        }
    }
}

impl std::fmt::Display for SaleChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured shipping address embedded in an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apartment: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl ShippingAddress {
    /// Default address for walk-in sales with no delivery
    pub fn pickup() -> Self {
        Self {
            street: "Retiro en local".to_string(),
            number: "S/N".to_string(),
            floor: None,
            apartment: None,
            neighborhood: "Centro".to_string(),
            city: "Córdoba".to_string(),
            state: "Córdoba".to_string(),
            postal_code: "5000".to_string(),
            country: "Argentina".to_string(),
            instructions: None,
        }
    }
}

/// Monetary totals of an order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Compute order totals from (unit price, quantity) pairs
pub fn compute_order_totals<I>(items: I, shipping_cost: Decimal, discount: Decimal) -> OrderTotals
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    let subtotal = items
        .into_iter()
        .fold(Decimal::ZERO, |sum, (unit_price, quantity)| {
            sum + unit_price * Decimal::from(quantity)
        });
    OrderTotals {
        subtotal,
        shipping_cost,
        discount,
        total: subtotal + shipping_cost - discount,
    }
}

/// Kilograms a line item removes from stock
pub fn line_total_kg(size_kg: Decimal, quantity: i32) -> Decimal {
    size_kg * Decimal::from(quantity)
}

/// Format an order number from the local date and a per-day sequence
///
/// The sequence restarts at 1 every day; numbers look like
/// `ORD-20250314-0001`.
pub fn format_order_number(date: NaiveDate, sequence: u32) -> String {
    format!("ORD-{}-{:04}", date.format("%Y%m%d"), sequence)
}
