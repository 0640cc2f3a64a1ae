//! Inventory and stock ledger models
//!
//! All quantities are kilograms. The balance columns kept by the backend
//! (`stock_kg`, `reserved_kg`, `available_kg`) are a cached view of the
//! movement log; `StockLevels` holds the arithmetic that keeps them
//! consistent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Types of stock movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
    Transfer,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
            MovementType::Transfer => "transfer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(MovementType::In),
            "out" => Some(MovementType::Out),
            "adjustment" => Some(MovementType::Adjustment),
            "transfer" => Some(MovementType::Transfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by the stock level arithmetic
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StockLevelError {
    #[error("insufficient stock: requested {requested_kg} kg with {stock_kg} kg on hand")]
    InsufficientStock {
        requested_kg: Decimal,
        stock_kg: Decimal,
        /// How many kilograms short the operation fell
        shortfall_kg: Decimal,
    },

    #[error("cannot reserve {requested_kg} kg: only {unreserved_kg} kg unreserved")]
    ReserveExceedsStock {
        requested_kg: Decimal,
        unreserved_kg: Decimal,
    },

    #[error("quantity must be positive, got {0} kg")]
    NonPositiveQuantity(Decimal),
}

/// Stock balance for a single product, in kilograms
///
/// Invariant: `available_kg == stock_kg - reserved_kg`. Every constructor
/// and operation recomputes the available figure, so a `StockLevels` value
/// can never drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockLevels {
    pub stock_kg: Decimal,
    pub reserved_kg: Decimal,
    pub available_kg: Decimal,
}

impl StockLevels {
    pub fn new(stock_kg: Decimal, reserved_kg: Decimal) -> Self {
        Self {
            stock_kg,
            reserved_kg,
            available_kg: stock_kg - reserved_kg,
        }
    }

    /// Apply a signed delta to the stock on hand
    ///
    /// Fails without producing new levels when the delta would drive the
    /// stock negative; the error carries the shortfall so callers can tell
    /// the buyer how many kilograms were missing.
    pub fn apply(&self, delta_kg: Decimal) -> Result<StockLevels, StockLevelError> {
        let new_stock = self.stock_kg + delta_kg;
        if new_stock < Decimal::ZERO {
            return Err(StockLevelError::InsufficientStock {
                requested_kg: delta_kg.abs(),
                stock_kg: self.stock_kg,
                shortfall_kg: -new_stock,
            });
        }
        Ok(StockLevels::new(new_stock, self.reserved_kg))
    }

    /// Reserve kilograms against the stock on hand
    pub fn reserve(&self, quantity_kg: Decimal) -> Result<StockLevels, StockLevelError> {
        if quantity_kg <= Decimal::ZERO {
            return Err(StockLevelError::NonPositiveQuantity(quantity_kg));
        }
        let new_reserved = self.reserved_kg + quantity_kg;
        if new_reserved > self.stock_kg {
            return Err(StockLevelError::ReserveExceedsStock {
                requested_kg: quantity_kg,
                unreserved_kg: self.stock_kg - self.reserved_kg,
            });
        }
        Ok(StockLevels::new(self.stock_kg, new_reserved))
    }

    /// Release previously reserved kilograms
    ///
    /// Clamps the reservation at zero rather than failing; releasing more
    /// than was reserved should not occur under correct usage.
    pub fn release(&self, quantity_kg: Decimal) -> Result<StockLevels, StockLevelError> {
        if quantity_kg <= Decimal::ZERO {
            return Err(StockLevelError::NonPositiveQuantity(quantity_kg));
        }
        let new_reserved = (self.reserved_kg - quantity_kg).max(Decimal::ZERO);
        Ok(StockLevels::new(self.stock_kg, new_reserved))
    }

    /// Whether the stock on hand is at or below the given alert threshold
    pub fn is_low(&self, min_stock_kg: Decimal) -> bool {
        self.stock_kg <= min_stock_kg
    }
}

/// Fold a sequence of signed movement deltas from zero
///
/// The movement log is the source of historical truth; the stored balance
/// is recoverable by replaying every delta in order.
pub fn replay_movements<I>(deltas: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    deltas
        .into_iter()
        .fold(Decimal::ZERO, |balance, delta| balance + delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_new_computes_available() {
        let levels = StockLevels::new(dec("20"), dec("5"));
        assert_eq!(levels.available_kg, dec("15"));
    }

    #[test]
    fn test_apply_positive_delta() {
        let levels = StockLevels::new(dec("10"), dec("2"));
        let after = levels.apply(dec("5")).unwrap();
        assert_eq!(after.stock_kg, dec("15"));
        assert_eq!(after.reserved_kg, dec("2"));
        assert_eq!(after.available_kg, dec("13"));
    }

    #[test]
    fn test_apply_negative_delta() {
        let levels = StockLevels::new(dec("20"), Decimal::ZERO);
        let after = levels.apply(dec("-15")).unwrap();
        assert_eq!(after.stock_kg, dec("5"));
        assert_eq!(after.available_kg, dec("5"));
    }

    #[test]
    fn test_apply_rejects_negative_stock() {
        let levels = StockLevels::new(dec("2"), Decimal::ZERO);
        let err = levels.apply(dec("-3")).unwrap_err();
        assert_eq!(
            err,
            StockLevelError::InsufficientStock {
                requested_kg: dec("3"),
                stock_kg: dec("2"),
                shortfall_kg: dec("1"),
            }
        );
    }

    #[test]
    fn test_apply_to_exactly_zero() {
        let levels = StockLevels::new(dec("3"), Decimal::ZERO);
        let after = levels.apply(dec("-3")).unwrap();
        assert_eq!(after.stock_kg, Decimal::ZERO);
        assert_eq!(after.available_kg, Decimal::ZERO);
    }

    #[test]
    fn test_reserve_within_stock() {
        let levels = StockLevels::new(dec("10"), dec("3"));
        let after = levels.reserve(dec("4")).unwrap();
        assert_eq!(after.reserved_kg, dec("7"));
        assert_eq!(after.available_kg, dec("3"));
    }

    #[test]
    fn test_reserve_exceeding_stock() {
        let levels = StockLevels::new(dec("10"), dec("8"));
        let err = levels.reserve(dec("3")).unwrap_err();
        assert_eq!(
            err,
            StockLevelError::ReserveExceedsStock {
                requested_kg: dec("3"),
                unreserved_kg: dec("2"),
            }
        );
    }

    #[test]
    fn test_release_clamps_at_zero() {
        let levels = StockLevels::new(dec("10"), dec("2"));
        let after = levels.release(dec("5")).unwrap();
        assert_eq!(after.reserved_kg, Decimal::ZERO);
        assert_eq!(after.available_kg, dec("10"));
    }

    #[test]
    fn test_non_positive_quantities_rejected() {
        let levels = StockLevels::new(dec("10"), Decimal::ZERO);
        assert!(levels.reserve(Decimal::ZERO).is_err());
        assert!(levels.reserve(dec("-1")).is_err());
        assert!(levels.release(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_low_stock_threshold() {
        let levels = StockLevels::new(dec("5"), Decimal::ZERO);
        assert!(levels.is_low(dec("5")));
        assert!(!levels.is_low(dec("4.9")));
    }

    #[test]
    fn test_replay_movements() {
        let deltas = vec![dec("50"), dec("-20"), dec("30"), dec("-15.5")];
        assert_eq!(replay_movements(deltas), dec("44.5"));
    }

    #[test]
    fn test_movement_type_round_trip() {
        for t in [
            MovementType::In,
            MovementType::Out,
            MovementType::Adjustment,
            MovementType::Transfer,
        ] {
            assert_eq!(MovementType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(MovementType::from_str("sale"), None);
    }
}
