//! Property-based tests for the payment ledger.

use chrono::Utc;
use facture_shared::types::{Currency, Money, PaymentId};
use proptest::prelude::*;

use super::ledger::PaymentLedger;
use super::types::{Payment, PaymentMethod, PaymentStatus};

const USD: Currency = Currency::Usd;

/// Strategy to generate payment amounts (0.01 to 10,000.00).
fn amount_minor() -> impl Strategy<Value = i64> {
    1i64..1_000_000
}

/// Strategy to generate a payment in any status.
fn any_payment() -> impl Strategy<Value = Payment> {
    (
        amount_minor(),
        prop::sample::select(vec![
            PaymentStatus::Pending,
            PaymentStatus::Processing,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
            PaymentStatus::Cancelled,
        ]),
    )
        .prop_map(|(minor, status)| Payment {
            id: PaymentId::new(),
            amount: Money::from_minor(minor, USD),
            method: PaymentMethod::Card,
            status,
            payment_date: Utc::now(),
            external_reference: None,
        })
}

fn payment_set() -> impl Strategy<Value = Vec<Payment>> {
    prop::collection::vec(any_payment(), 0..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* payment set, the paid amount SHALL equal the sum of the
    /// amounts of exactly the COMPLETED payments.
    #[test]
    fn prop_paid_amount_sums_completed(payments in payment_set()) {
        let paid = PaymentLedger::paid_amount(&payments, USD).unwrap();
        let expected: i64 = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| p.amount.minor_units())
            .sum();
        prop_assert_eq!(paid.minor_units(), expected);
    }

    /// *For any* payment set, deriving the paid amount twice SHALL produce
    /// the same result (no drift).
    #[test]
    fn prop_paid_amount_is_deterministic(payments in payment_set()) {
        let first = PaymentLedger::paid_amount(&payments, USD).unwrap();
        let second = PaymentLedger::paid_amount(&payments, USD).unwrap();
        prop_assert_eq!(first, second);
    }

    /// *For any* total and paid amounts, the balance due SHALL be
    /// `max(0, total - paid)` and never negative.
    #[test]
    fn prop_balance_due_never_negative(
        total in 0i64..10_000_000,
        paid in 0i64..10_000_000,
    ) {
        let balance = PaymentLedger::balance_due(
            Money::from_minor(total, USD),
            Money::from_minor(paid, USD),
        )
        .unwrap();
        prop_assert!(!balance.is_negative());
        prop_assert_eq!(balance.minor_units(), (total - paid).max(0));
    }

    /// *For any* completed payment in a set, refunding it SHALL reduce the
    /// paid amount by exactly its amount.
    #[test]
    fn prop_refund_subtracts_exactly(mut payments in payment_set()) {
        let before = PaymentLedger::paid_amount(&payments, USD).unwrap();
        let completed_idx = payments
            .iter()
            .position(|p| p.status == PaymentStatus::Completed);

        if let Some(idx) = completed_idx {
            let refunded_amount = payments[idx].amount;
            payments[idx].status = PaymentStatus::Refunded;
            let after = PaymentLedger::paid_amount(&payments, USD).unwrap();
            prop_assert_eq!(
                after.minor_units(),
                before.minor_units() - refunded_amount.minor_units()
            );
        }
    }

    /// *For any* amount, balance, and tolerance, the overpayment guard
    /// SHALL accept exactly the amounts within `balance + tolerance`.
    #[test]
    fn prop_overpayment_guard_boundary(
        amount in amount_minor(),
        balance in 0i64..1_000_000,
        tolerance in 0i64..100,
    ) {
        let result = PaymentLedger::validate_against_balance(
            Money::from_minor(amount, USD),
            Money::from_minor(balance, USD),
            Money::from_minor(tolerance, USD),
        );
        prop_assert_eq!(result.is_ok(), amount <= balance + tolerance);
    }
}
