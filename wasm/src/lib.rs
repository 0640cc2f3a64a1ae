//! WebAssembly module for the Yerba Store Platform
//!
//! Provides client-side state and computation for the storefront:
//! - Shopping cart store (persisted to localStorage as JSON by the host)
//! - Checkout form validation
//!
//! The cart is advisory only: final stock correctness depends entirely on
//! the server-side transactional check at order-creation time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn default_quantity() -> u32 {
    1
}

/// One line in the shopping cart, keyed by (product, package size)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub product_name: String,
    pub size_kg: Decimal,
    pub price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Client-side cart state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartState {
    pub items: Vec<CartItem>,
}

impl CartState {
    fn position(&self, product_id: &str, size_kg: Decimal) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id == product_id && item.size_kg == size_kg)
    }

    /// Add an item; an existing (product, size) line has its quantity bumped
    pub fn add_item(&mut self, item: CartItem) {
        match self.position(&item.product_id, item.size_kg) {
            Some(index) => self.items[index].quantity += item.quantity.max(1),
            None => self.items.push(item),
        }
    }

    pub fn remove_item(&mut self, product_id: &str, size_kg: Decimal) {
        self.items
            .retain(|item| !(item.product_id == product_id && item.size_kg == size_kg));
    }

    /// Set a line's quantity; zero removes the line
    pub fn update_quantity(&mut self, product_id: &str, size_kg: Decimal, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id, size_kg);
            return;
        }
        if let Some(index) = self.position(product_id, size_kg) {
            self.items[index].quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of packages across all lines
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Total price of the cart
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Total kilograms in the cart
    pub fn total_kg(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.size_kg * Decimal::from(item.quantity))
            .sum()
    }
}

/// Shopping cart store exposed to JavaScript
#[wasm_bindgen]
pub struct CartStore {
    state: CartState,
}

#[wasm_bindgen]
impl CartStore {
    #[wasm_bindgen(constructor)]
    pub fn new() -> CartStore {
        CartStore {
            state: CartState::default(),
        }
    }

    /// Restore a cart persisted as JSON
    pub fn from_json(json: &str) -> Result<CartStore, JsValue> {
        let state: CartState = serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid cart JSON: {}", e)))?;
        Ok(CartStore { state })
    }

    /// Serialize the cart for persistence
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state)
            .map_err(|e| JsValue::from_str(&format!("Cart serialization failed: {}", e)))
    }

    pub fn add_item(&mut self, item_json: &str) -> Result<(), JsValue> {
        let item: CartItem = serde_json::from_str(item_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid cart item JSON: {}", e)))?;
        self.state.add_item(item);
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str, size_kg: f64) -> Result<(), JsValue> {
        let size = decimal_from_f64(size_kg)?;
        self.state.remove_item(product_id, size);
        Ok(())
    }

    pub fn update_quantity(
        &mut self,
        product_id: &str,
        size_kg: f64,
        quantity: u32,
    ) -> Result<(), JsValue> {
        let size = decimal_from_f64(size_kg)?;
        self.state.update_quantity(product_id, size, quantity);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.state.clear();
    }

    pub fn total_items(&self) -> u32 {
        self.state.total_items()
    }

    pub fn total_price(&self) -> f64 {
        self.state.total_price().to_string().parse().unwrap_or(0.0)
    }

    pub fn total_kg(&self) -> f64 {
        self.state.total_kg().to_string().parse().unwrap_or(0.0)
    }

    pub fn item_count(&self) -> usize {
        self.state.items.len()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

fn decimal_from_f64(value: f64) -> Result<Decimal, JsValue> {
    Decimal::try_from(value)
        .map(|d| d.normalize())
        .map_err(|e| JsValue::from_str(&format!("Invalid decimal value: {}", e)))
}

/// Package sizes offered for a product, with prices, ascending by size
///
/// Takes the product's `prices_per_kg` object and `available_sizes` array
/// as JSON; returns a JSON array of `{ size_kg, price }`.
#[wasm_bindgen]
pub fn offered_sizes(prices_json: &str, sizes_json: &str) -> Result<String, JsValue> {
    let prices: shared::models::PricesPerKg = serde_json::from_str(prices_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid prices JSON: {}", e)))?;
    let sizes: Vec<Decimal> = serde_json::from_str(sizes_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid sizes JSON: {}", e)))?;

    let offered = shared::models::sizes_with_prices(&sizes, &prices);
    serde_json::to_string(&offered)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Validate an email address from the checkout form
#[wasm_bindgen]
pub fn is_valid_email(email: &str) -> bool {
    shared::validation::validate_email(email).is_ok()
}

/// Validate an Argentine phone number from the checkout form
#[wasm_bindgen]
pub fn is_valid_phone(phone: &str) -> bool {
    shared::validation::validate_argentine_phone(phone).is_ok()
}

/// Validate an Argentine postal code from the checkout form
#[wasm_bindgen]
pub fn is_valid_postal_code(postal_code: &str) -> bool {
    shared::validation::validate_argentine_postal_code(postal_code).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(product_id: &str, size: &str, price: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: product_id.to_string(),
            product_name: format!("Product {}", product_id),
            size_kg: dec(size),
            price: dec(price),
            quantity,
            image: None,
        }
    }

    #[test]
    fn test_add_item_merges_same_product_and_size() {
        let mut cart = CartState::default();
        cart.add_item(item("p1", "0.5", "1800", 1));
        cart.add_item(item("p1", "0.5", "1800", 2));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[test]
    fn test_add_item_same_product_different_size() {
        let mut cart = CartState::default();
        cart.add_item(item("p1", "0.5", "1800", 1));
        cart.add_item(item("p1", "1", "3200", 1));

        assert_eq!(cart.items.len(), 2);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = CartState::default();
        cart.add_item(item("p1", "0.5", "1800", 1));
        cart.add_item(item("p2", "1", "3200", 1));

        cart.remove_item("p1", dec("0.5"));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, "p2");
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = CartState::default();
        cart.add_item(item("p1", "1", "3200", 1));

        cart.update_quantity("p1", dec("1"), 5);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = CartState::default();
        cart.add_item(item("p1", "1", "3200", 2));

        cart.update_quantity("p1", dec("1"), 0);
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = CartState::default();
        cart.add_item(item("p1", "0.5", "1800", 2));
        cart.add_item(item("p2", "1", "3200", 3));

        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price(), dec("13200"));
        assert_eq!(cart.total_kg(), dec("4"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut cart = CartState::default();
        cart.add_item(item("p1", "0.5", "1800", 2));

        let json = serde_json::to_string(&cart).unwrap();
        let restored: CartState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.items, cart.items);
    }

    #[test]
    fn test_item_json_defaults_quantity() {
        let json = r#"{"product_id":"p1","product_name":"Yerba","size_kg":"0.5","price":"1800"}"#;
        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.quantity, 1);
    }
}
