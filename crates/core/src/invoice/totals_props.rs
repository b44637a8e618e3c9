//! Property-based tests for charge calculation.

use facture_shared::types::{Currency, LineItemId, Money};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::totals::{self, InvoiceTotals};
use super::types::{DiscountKind, DiscountSpec, LineItem};

const USD: Currency = Currency::Usd;

/// Strategy to generate line items with minor-unit rates (0.00 to 10,000.00)
/// and quantities with up to 2 decimal places (0.01 to 1,000.00).
fn line_item() -> impl Strategy<Value = LineItem> {
    (0i64..1_000_000, 1i64..100_000).prop_map(|(rate_minor, qty_hundredths)| LineItem {
        id: LineItemId::new(),
        description: "item".to_string(),
        quantity: Decimal::new(qty_hundredths, 2),
        rate: Money::from_minor(rate_minor, USD),
    })
}

fn line_items() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(line_item(), 0..10)
}

/// Strategy to generate tax rates (0.00 to 100.00).
fn tax_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|v| Decimal::new(v, 2))
}

/// Strategy to generate discounts of either kind, including percentage
/// values above 100.
fn discount() -> impl Strategy<Value = DiscountSpec> {
    prop_oneof![
        (0i64..2_000_000).prop_map(|v| DiscountSpec {
            kind: DiscountKind::Fixed,
            value: Decimal::new(v, 2),
        }),
        (0i64..15_000).prop_map(|v| DiscountSpec {
            kind: DiscountKind::Percentage,
            value: Decimal::new(v, 2),
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* line item set, the subtotal SHALL equal the sum of the
    /// per-item rounded amounts.
    #[test]
    fn prop_subtotal_is_sum_of_item_amounts(items in line_items()) {
        let subtotal = totals::subtotal(&items, USD).unwrap();
        let expected: i64 = items
            .iter()
            .map(|i| i.amount().unwrap().minor_units())
            .sum();
        prop_assert_eq!(subtotal.minor_units(), expected);
    }

    /// *For any* inputs, `total = subtotal + tax - discount` SHALL hold
    /// before flooring, and the reported total SHALL never be negative.
    #[test]
    fn prop_total_identity_and_non_negative(
        items in line_items(),
        rate in tax_rate(),
        discount in discount(),
    ) {
        let t = InvoiceTotals::compute(&items, rate, &discount, &[], USD).unwrap();

        let raw = t.subtotal.minor_units() + t.tax_amount.minor_units()
            - t.discount_amount.minor_units();
        prop_assert_eq!(t.total_amount.minor_units(), raw.max(0));
        prop_assert!(!t.total_amount.is_negative());
        prop_assert!(!t.tax_amount.is_negative());
        prop_assert!(!t.discount_amount.is_negative());
    }

    /// *For any* inputs, the effective discount SHALL never exceed the
    /// subtotal.
    #[test]
    fn prop_discount_capped_at_subtotal(
        items in line_items(),
        rate in tax_rate(),
        discount in discount(),
    ) {
        let t = InvoiceTotals::compute(&items, rate, &discount, &[], USD).unwrap();
        prop_assert!(t.discount_amount.minor_units() <= t.subtotal.minor_units());
    }

    /// *For any* inputs, computing twice SHALL produce identical results
    /// (no drift).
    #[test]
    fn prop_compute_is_idempotent(
        items in line_items(),
        rate in tax_rate(),
        discount in discount(),
    ) {
        let first = InvoiceTotals::compute(&items, rate, &discount, &[], USD).unwrap();
        let second = InvoiceTotals::compute(&items, rate, &discount, &[], USD).unwrap();
        prop_assert_eq!(first, second);
    }

    /// *For any* subtotal, a 100% discount with zero tax SHALL produce a
    /// zero total.
    #[test]
    fn prop_full_percentage_discount_zeroes_total(items in line_items()) {
        let discount = DiscountSpec {
            kind: DiscountKind::Percentage,
            value: Decimal::ONE_HUNDRED,
        };
        let t = InvoiceTotals::compute(&items, Decimal::ZERO, &discount, &[], USD).unwrap();
        prop_assert!(t.total_amount.is_zero());
    }
}
