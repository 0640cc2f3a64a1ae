//! Product models and price lookups
//!
//! A product is sold in discrete package sizes (0.5 kg, 1 kg, ...); its
//! price list maps the package size, as a decimal string key, to the unit
//! price of one package of that size.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Publication state of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Inactive,
    Draft,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Draft => "draft",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProductStatus::Active),
            "inactive" => Some(ProductStatus::Inactive),
            "draft" => Some(ProductStatus::Draft),
            _ => None,
        }
    }
}

/// Price list keyed by package size
pub type PricesPerKg = BTreeMap<String, Decimal>;

/// A package size offered with its price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePrice {
    pub size_kg: Decimal,
    pub price: Decimal,
}

/// Canonical price-list key for a package size
///
/// Trailing zeros are trimmed so `0.50` and `0.5` address the same entry.
pub fn size_key(size_kg: Decimal) -> String {
    size_kg.normalize().to_string()
}

/// Price of one package of the given size, if offered
pub fn price_for_size(prices: &PricesPerKg, size_kg: Decimal) -> Option<Decimal> {
    prices.get(&size_key(size_kg)).copied()
}

/// Offered sizes with their prices, ascending by size
///
/// Sizes without a positive price are dropped; they are not purchasable.
pub fn sizes_with_prices(available_sizes: &[Decimal], prices: &PricesPerKg) -> Vec<SizePrice> {
    let mut out: Vec<SizePrice> = available_sizes
        .iter()
        .filter_map(|&size_kg| {
            price_for_size(prices, size_kg)
                .filter(|price| *price > Decimal::ZERO)
                .map(|price| SizePrice { size_kg, price })
        })
        .collect();
    out.sort_by(|a, b| a.size_kg.cmp(&b.size_kg));
    out
}
