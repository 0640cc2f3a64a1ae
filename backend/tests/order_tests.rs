//! Order writer tests
//!
//! Tests for order arithmetic and transaction semantics:
//! - Totals: subtotal = sum(unit_price * quantity), total includes
//!   shipping and discount
//! - Order numbering: per-day sequence, daily reset
//! - Atomicity: a failing line item leaves every balance untouched

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use shared::models::{
    compute_order_totals, format_order_number, line_total_kg, StockLevels,
};
use shared::validation::validate_order_number;

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

    /// subtotal = sum(unit_price * quantity); total adds shipping and
    /// subtracts discount
    #[test]
    fn test_order_totals() {
        let items = vec![(dec("3200"), 2), (dec("1800"), 3)];
        let totals = compute_order_totals(items, dec("1200"), dec("500"));

        assert_eq!(totals.subtotal, dec("11800"));
        assert_eq!(totals.shipping_cost, dec("1200"));
        assert_eq!(totals.discount, dec("500"));
        assert_eq!(totals.total, dec("12500"));
    }

    /// Two line items, (1 kg x 2) and (0.5 kg x 3), weigh 2.0 kg and
    /// 1.5 kg; their stock movements carry matching negative deltas
    #[test]
    fn test_line_item_kilograms() {
        let first = line_total_kg(dec("1"), 2);
        let second = line_total_kg(dec("0.5"), 3);

        assert_eq!(first, dec("2.0"));
        assert_eq!(second, dec("1.5"));

        let p1 = StockLevels::new(dec("10"), Decimal::ZERO);
        let p2 = StockLevels::new(dec("10"), Decimal::ZERO);
        let movements = vec![-first, -second];

        assert_eq!(p1.apply(movements[0]).unwrap().stock_kg, dec("8.0"));
        assert_eq!(p2.apply(movements[1]).unwrap().stock_kg, dec("8.5"));
        assert!(movements.iter().all(|delta| *delta < Decimal::ZERO));
    }

    /// Orders on the same day take sequential numbers with no gaps
    #[test]
    fn test_order_numbers_sequential_same_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        let first = format_order_number(date, 1);
        let second = format_order_number(date, 2);

        assert_eq!(first, "ORD-20250314-0001");
        assert_eq!(second, "ORD-20250314-0002");
        assert_ne!(first, second);
    }

    /// A new day resets the sequence to 1
    #[test]
    fn test_order_number_daily_reset() {
        let friday = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

        let last_of_friday = format_order_number(friday, 27);
        let first_of_saturday = format_order_number(saturday, 1);

        assert_eq!(last_of_friday, "ORD-20250314-0027");
        assert_eq!(first_of_saturday, "ORD-20250315-0001");
    }

    /// Generated order numbers satisfy the format validator
    #[test]
    fn test_order_number_format_valid() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        for sequence in [1, 99, 9999, 10001] {
            let number = format_order_number(date, sequence);
            assert!(validate_order_number(&number).is_ok(), "{}", number);
        }
    }

    /// A customer with 3 orders and $1000 spent who places a $250 order
    /// ends at 4 orders and $1250
    #[test]
    fn test_customer_stats_increment() {
        let (total_orders, total_spent) = (3, dec("1000"));
        let order_total = dec("250");

        let after_orders = total_orders + 1;
        let after_spent = total_spent + order_total;

        assert_eq!(after_orders, 4);
        assert_eq!(after_spent, dec("1250"));
    }
}

// ============================================================================
// Transaction Semantics (simulated against in-memory balances)
// ============================================================================

#[cfg(test)]
mod atomicity_tests {
    use super::*;

    /// Apply an order's line items against per-product balances the way the
    /// order transaction does: validate and stage every decrement, then
    /// commit only if the whole set succeeded.
    fn simulate_order(
        stocks: &mut BTreeMap<&'static str, StockLevels>,
        items: &[(&'static str, Decimal, i32)],
    ) -> Result<(), String> {
        let mut staged = stocks.clone();

        for (product, size_kg, quantity) in items {
            let levels = staged
                .get(product)
                .copied()
                .ok_or_else(|| format!("no inventory for {}", product))?;
            let after = levels
                .apply(-line_total_kg(*size_kg, *quantity))
                .map_err(|e| e.to_string())?;
            staged.insert(product, after);
        }

        *stocks = staged;
        Ok(())
    }

    #[test]
    fn test_order_commits_all_decrements() {
        let mut stocks = BTreeMap::from([
            ("p1", StockLevels::new(dec("10"), Decimal::ZERO)),
            ("p2", StockLevels::new(dec("10"), Decimal::ZERO)),
        ]);

        simulate_order(&mut stocks, &[("p1", dec("1"), 2), ("p2", dec("0.5"), 3)]).unwrap();

        assert_eq!(stocks["p1"].stock_kg, dec("8.0"));
        assert_eq!(stocks["p2"].stock_kg, dec("8.5"));
    }

    /// Insufficient stock on the second line leaves the first line's
    /// balance untouched
    #[test]
    fn test_failed_line_rolls_back_everything() {
        let mut stocks = BTreeMap::from([
            ("p1", StockLevels::new(dec("10"), Decimal::ZERO)),
            ("p2", StockLevels::new(dec("1"), Decimal::ZERO)),
        ]);

        let result = simulate_order(&mut stocks, &[("p1", dec("1"), 2), ("p2", dec("1"), 2)]);

        assert!(result.is_err());
        assert_eq!(stocks["p1"].stock_kg, dec("10"));
        assert_eq!(stocks["p2"].stock_kg, dec("1"));
    }

    #[test]
    fn test_unknown_product_rolls_back_everything() {
        let mut stocks = BTreeMap::from([("p1", StockLevels::new(dec("10"), Decimal::ZERO))]);

        let result = simulate_order(&mut stocks, &[("p1", dec("1"), 1), ("ghost", dec("1"), 1)]);

        assert!(result.is_err());
        assert_eq!(stocks["p1"].stock_kg, dec("10"));
    }

    /// The same order against the same stock twice: the second run sees the
    /// first run's decrements, exactly like serialized transactions
    #[test]
    fn test_sequential_orders_serialize() {
        let mut stocks = BTreeMap::from([("p1", StockLevels::new(dec("3"), Decimal::ZERO))]);
        let items = [("p1", dec("1"), 2)];

        assert!(simulate_order(&mut stocks, &items).is_ok());
        let second = simulate_order(&mut stocks, &items);

        assert!(second.is_err());
        assert_eq!(stocks["p1"].stock_kg, dec("1"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn quantity_strategy() -> impl Strategy<Value = i32> {
        1i32..=50
    }

    fn size_strategy() -> impl Strategy<Value = Decimal> {
        prop_oneof![
            Just(Decimal::new(25, 2)),
            Just(Decimal::new(5, 1)),
            Just(Decimal::ONE),
            Just(Decimal::TWO),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// subtotal equals the item-by-item sum, and the total moves
        /// one-for-one with shipping and discount
        #[test]
        fn prop_totals_arithmetic(
            items in prop::collection::vec((price_strategy(), quantity_strategy()), 1..10),
            shipping in price_strategy(),
            discount in price_strategy()
        ) {
            let expected_subtotal: Decimal = items
                .iter()
                .map(|(price, qty)| *price * Decimal::from(*qty))
                .sum();

            let totals = compute_order_totals(items, shipping, discount);

            prop_assert_eq!(totals.subtotal, expected_subtotal);
            prop_assert_eq!(totals.total, expected_subtotal + shipping - discount);
        }

        /// total_kg scales linearly with quantity
        #[test]
        fn prop_line_kg_scales(size in size_strategy(), qty in quantity_strategy()) {
            let one = line_total_kg(size, 1);
            let many = line_total_kg(size, qty);
            prop_assert_eq!(many, one * Decimal::from(qty));
        }

        /// Every generated order number round-trips the validator, and the
        /// sequence is recoverable from the formatted number
        #[test]
        fn prop_order_number_well_formed(
            year in 2024i32..=2030,
            month in 1u32..=12,
            day in 1u32..=28,
            sequence in 1u32..=9999
        ) {
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            let number = format_order_number(date, sequence);

            prop_assert!(validate_order_number(&number).is_ok());

            let parts: Vec<&str> = number.split('-').collect();
            prop_assert_eq!(parts[2].parse::<u32>().unwrap(), sequence);
        }

        /// Same day, consecutive sequences, distinct numbers
        #[test]
        fn prop_order_numbers_unique_per_day(
            sequence in 1u32..=9998
        ) {
            let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
            let a = format_order_number(date, sequence);
            let b = format_order_number(date, sequence + 1);
            prop_assert_ne!(a, b);
        }
    }
}
