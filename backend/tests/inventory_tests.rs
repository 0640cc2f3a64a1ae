//! Inventory ledger tests
//!
//! Tests for the stock ledger including:
//! - Balance invariant: available_kg == stock_kg - reserved_kg
//! - Non-negativity: stock never goes below zero
//! - Movement replay: folding deltas from zero reproduces the balance

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{replay_movements, MovementType, StockLevelError, StockLevels};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Decrementing 15 kg from a 20 kg balance leaves 5 kg, which sits
    /// exactly at a 5 kg minimum and must show up as low stock
    #[test]
    fn test_decrement_to_low_stock_threshold() {
        let levels = StockLevels::new(dec("20"), Decimal::ZERO);
        let min_stock_kg = dec("5");

        let after = levels.apply(dec("-15")).unwrap();

        assert_eq!(after.stock_kg, dec("5"));
        assert_eq!(after.available_kg, dec("5"));
        assert!(after.is_low(min_stock_kg));
    }

    /// Decrementing 3 kg from a 2 kg balance fails and mutates nothing
    #[test]
    fn test_insufficient_stock_rejected() {
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
        // The original levels are untouched
        assert_eq!(levels.stock_kg, dec("2"));
        assert_eq!(levels.available_kg, dec("2"));
    }

    /// The shortfall names exactly how many kilograms were missing
    #[test]
    fn test_shortfall_amount() {
        let levels = StockLevels::new(dec("1.5"), Decimal::ZERO);
        match levels.apply(dec("-4")) {
            Err(StockLevelError::InsufficientStock { shortfall_kg, .. }) => {
                assert_eq!(shortfall_kg, dec("2.5"));
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
    }

    /// Draining to exactly zero is allowed
    #[test]
    fn test_drain_to_zero() {
        let levels = StockLevels::new(dec("7.5"), Decimal::ZERO);
        let after = levels.apply(dec("-7.5")).unwrap();
        assert_eq!(after.stock_kg, Decimal::ZERO);
    }

    /// Reservations reduce availability without touching stock
    #[test]
    fn test_reserve_reduces_available_only() {
        let levels = StockLevels::new(dec("10"), Decimal::ZERO);
        let after = levels.reserve(dec("4")).unwrap();

        assert_eq!(after.stock_kg, dec("10"));
        assert_eq!(after.reserved_kg, dec("4"));
        assert_eq!(after.available_kg, dec("6"));
    }

    /// Reserving more than the unreserved balance fails
    #[test]
    fn test_reserve_beyond_stock_rejected() {
        let levels = StockLevels::new(dec("10"), dec("7"));
        let err = levels.reserve(dec("4")).unwrap_err();

        assert_eq!(
            err,
            StockLevelError::ReserveExceedsStock {
                requested_kg: dec("4"),
                unreserved_kg: dec("3"),
            }
        );
    }

    /// Releasing more than was reserved clamps at zero
    #[test]
    fn test_release_clamps_at_zero() {
        let levels = StockLevels::new(dec("10"), dec("2"));
        let after = levels.release(dec("3")).unwrap();

        assert_eq!(after.reserved_kg, Decimal::ZERO);
        assert_eq!(after.available_kg, dec("10"));
    }

    /// Replaying every movement from zero reproduces the balance
    #[test]
    fn test_movement_replay() {
        let mut levels = StockLevels::new(Decimal::ZERO, Decimal::ZERO);
        let mut recorded = Vec::new();

        for delta in [dec("50"), dec("-20"), dec("30"), dec("-15.5")] {
            levels = levels.apply(delta).unwrap();
            recorded.push(delta);
        }

        assert_eq!(replay_movements(recorded), levels.stock_kg);
        assert_eq!(levels.stock_kg, dec("44.5"));
    }

    /// A rejected movement must not be recorded, so replay still matches
    #[test]
    fn test_rejected_movement_not_in_replay() {
        let mut levels = StockLevels::new(Decimal::ZERO, Decimal::ZERO);
        let mut recorded = Vec::new();

        for delta in [dec("10"), dec("-25"), dec("5")] {
            if let Ok(after) = levels.apply(delta) {
                levels = after;
                recorded.push(delta);
            }
        }

        assert_eq!(recorded.len(), 2);
        assert_eq!(replay_movements(recorded), levels.stock_kg);
        assert_eq!(levels.stock_kg, dec("15"));
    }

    /// Movement type labels match the wire format
    #[test]
    fn test_movement_type_labels() {
        assert_eq!(MovementType::In.as_str(), "in");
        assert_eq!(MovementType::Out.as_str(), "out");
        assert_eq!(MovementType::Adjustment.as_str(), "adjustment");
        assert_eq!(MovementType::Transfer.as_str(), "transfer");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for kilogram quantities (0.001 to 1000.000)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 3))
    }

    /// Strategy for signed deltas
    fn delta_strategy() -> impl Strategy<Value = Decimal> {
        (-1_000_000i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 3))
    }

    #[derive(Debug, Clone)]
    enum LedgerOp {
        Apply(Decimal),
        Reserve(Decimal),
        Release(Decimal),
    }

    fn op_strategy() -> impl Strategy<Value = LedgerOp> {
        prop_oneof![
            delta_strategy().prop_map(LedgerOp::Apply),
            quantity_strategy().prop_map(LedgerOp::Reserve),
            quantity_strategy().prop_map(LedgerOp::Release),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// available == stock - reserved after any sequence of operations,
        /// and stock/reserved never go negative
        #[test]
        fn prop_invariants_hold_under_any_sequence(
            ops in prop::collection::vec(op_strategy(), 1..40)
        ) {
            let mut levels = StockLevels::new(Decimal::ZERO, Decimal::ZERO);

            for op in ops {
                let result = match op {
                    LedgerOp::Apply(delta) => levels.apply(delta),
                    LedgerOp::Reserve(qty) => levels.reserve(qty),
                    LedgerOp::Release(qty) => levels.release(qty),
                };
                if let Ok(after) = result {
                    levels = after;
                }

                prop_assert_eq!(levels.available_kg, levels.stock_kg - levels.reserved_kg);
                prop_assert!(levels.stock_kg >= Decimal::ZERO);
                prop_assert!(levels.reserved_kg >= Decimal::ZERO);
            }
        }

        /// apply either succeeds with non-negative stock or fails leaving
        /// the input untouched
        #[test]
        fn prop_apply_never_goes_negative(
            stock in quantity_strategy(),
            delta in delta_strategy()
        ) {
            let levels = StockLevels::new(stock, Decimal::ZERO);

            match levels.apply(delta) {
                Ok(after) => {
                    prop_assert!(after.stock_kg >= Decimal::ZERO);
                    prop_assert_eq!(after.stock_kg, stock + delta);
                }
                Err(StockLevelError::InsufficientStock { shortfall_kg, .. }) => {
                    prop_assert!(stock + delta < Decimal::ZERO);
                    prop_assert_eq!(shortfall_kg, -(stock + delta));
                }
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }

        /// Folding the deltas of every accepted movement reproduces the
        /// stored balance exactly
        #[test]
        fn prop_replay_reproduces_balance(
            deltas in prop::collection::vec(delta_strategy(), 1..50)
        ) {
            let mut levels = StockLevels::new(Decimal::ZERO, Decimal::ZERO);
            let mut recorded = Vec::new();

            for delta in deltas {
                if let Ok(after) = levels.apply(delta) {
                    levels = after;
                    recorded.push(delta);
                }
            }

            prop_assert_eq!(replay_movements(recorded), levels.stock_kg);
        }

        /// Reserving then releasing the same quantity restores availability
        #[test]
        fn prop_reserve_release_round_trip(
            stock in quantity_strategy(),
            qty in quantity_strategy()
        ) {
            let levels = StockLevels::new(stock, Decimal::ZERO);

            if let Ok(reserved) = levels.reserve(qty) {
                let released = reserved.release(qty).unwrap();
                prop_assert_eq!(released.available_kg, levels.available_kg);
                prop_assert_eq!(released.reserved_kg, Decimal::ZERO);
            } else {
                // Reserve only fails when the quantity exceeds the stock
                prop_assert!(qty > stock);
            }
        }

        /// Low-stock detection is exactly stock <= threshold
        #[test]
        fn prop_low_stock_threshold(
            stock in quantity_strategy(),
            threshold in quantity_strategy()
        ) {
            let levels = StockLevels::new(stock, Decimal::ZERO);
            prop_assert_eq!(levels.is_low(threshold), stock <= threshold);
        }
    }
}
