//! Payment ledger: paid-amount derivation and recording guards.
//!
//! The ledger is a pure projection over an invoice's payment set. It never
//! stores running sums; `paid_amount` and `balance_due` are recomputed from
//! the payments on every call, so a refund is reflected the moment the
//! payment's status changes.

use facture_shared::types::{Currency, Money, MoneyError};

use crate::payment::error::PaymentError;
use crate::payment::types::{Payment, PaymentStatus};

/// Stateless service deriving ledger figures and guarding payment writes.
pub struct PaymentLedger;

impl PaymentLedger {
    /// Sum of all payments that currently count toward the paid amount
    /// (status `Completed` only).
    pub fn paid_amount(payments: &[Payment], currency: Currency) -> Result<Money, MoneyError> {
        let mut paid = Money::zero(currency);
        for payment in payments {
            if payment.status.counts_toward_paid() {
                paid = paid.try_add(payment.amount)?;
            }
        }
        Ok(paid)
    }

    /// Outstanding balance: `max(0, total - paid)`.
    pub fn balance_due(total: Money, paid: Money) -> Result<Money, MoneyError> {
        total.saturating_sub(paid)
    }

    /// Number of payments currently in `Completed` status.
    #[must_use]
    pub fn completed_count(payments: &[Payment]) -> usize {
        payments
            .iter()
            .filter(|p| p.status.counts_toward_paid())
            .count()
    }

    /// Validate the amount of a payment being recorded.
    pub fn validate_amount(amount: Money) -> Result<(), PaymentError> {
        if amount.is_positive() {
            Ok(())
        } else {
            Err(PaymentError::NonPositiveAmount)
        }
    }

    /// Validate the initial status of a payment being recorded.
    ///
    /// Provider webhooks report `Completed` or `Failed` outcomes directly;
    /// manual entry starts at `Pending` or `Processing`. A payment can
    /// never be born `Refunded` or `Cancelled`.
    pub fn validate_initial_status(status: PaymentStatus) -> Result<(), PaymentError> {
        match status {
            PaymentStatus::Pending
            | PaymentStatus::Processing
            | PaymentStatus::Completed
            | PaymentStatus::Failed => Ok(()),
            PaymentStatus::Refunded | PaymentStatus::Cancelled => {
                Err(PaymentError::InvalidInitialStatus(status))
            }
        }
    }

    /// Guard a completing payment against the outstanding balance.
    ///
    /// Refuses any amount that would push the paid total past the invoice
    /// total by more than `tolerance` (zero by default: strict rejection at
    /// the balance due). Re-run whenever a pending payment completes, since
    /// the balance may have moved in the meantime.
    pub fn validate_against_balance(
        amount: Money,
        balance_due: Money,
        tolerance: Money,
    ) -> Result<(), PaymentError> {
        let allowed = balance_due
            .try_add(tolerance)
            .map_err(|_| PaymentError::Overpayment {
                attempted: amount,
                balance_due,
            })?;
        if amount.minor_units() > allowed.minor_units() {
            return Err(PaymentError::Overpayment {
                attempted: amount,
                balance_due,
            });
        }
        Ok(())
    }

    /// Validate a payment status transition.
    pub fn validate_transition(
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<(), PaymentError> {
        if from.can_transition(to) {
            Ok(())
        } else {
            Err(PaymentError::InvalidStatusTransition { from, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::types::PaymentMethod;
    use chrono::Utc;
    use facture_shared::types::PaymentId;

    const USD: Currency = Currency::Usd;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, USD)
    }

    fn payment(minor: i64, status: PaymentStatus) -> Payment {
        Payment {
            id: PaymentId::new(),
            amount: usd(minor),
            method: PaymentMethod::Card,
            status,
            payment_date: Utc::now(),
            external_reference: None,
        }
    }

    #[test]
    fn test_paid_amount_sums_completed_only() {
        let payments = vec![
            payment(4000, PaymentStatus::Completed),
            payment(2500, PaymentStatus::Pending),
            payment(1000, PaymentStatus::Failed),
            payment(6000, PaymentStatus::Completed),
        ];
        let paid = PaymentLedger::paid_amount(&payments, USD).unwrap();
        assert_eq!(paid, usd(10000));
    }

    #[test]
    fn test_paid_amount_empty() {
        let paid = PaymentLedger::paid_amount(&[], USD).unwrap();
        assert!(paid.is_zero());
    }

    #[test]
    fn test_refunded_payment_stops_counting() {
        let mut payments = vec![
            payment(4000, PaymentStatus::Completed),
            payment(6000, PaymentStatus::Completed),
        ];
        assert_eq!(PaymentLedger::paid_amount(&payments, USD).unwrap(), usd(10000));

        payments[0].status = PaymentStatus::Refunded;
        assert_eq!(PaymentLedger::paid_amount(&payments, USD).unwrap(), usd(6000));
    }

    #[test]
    fn test_balance_due_clamps_at_zero() {
        assert_eq!(
            PaymentLedger::balance_due(usd(10000), usd(4000)).unwrap(),
            usd(6000)
        );
        // Overpaid state displays a zero balance, never a negative one
        assert_eq!(
            PaymentLedger::balance_due(usd(10000), usd(12000)).unwrap(),
            usd(0)
        );
    }

    #[test]
    fn test_completed_count() {
        let payments = vec![
            payment(4000, PaymentStatus::Completed),
            payment(2500, PaymentStatus::Refunded),
            payment(1000, PaymentStatus::Pending),
        ];
        assert_eq!(PaymentLedger::completed_count(&payments), 1);
    }

    #[test]
    fn test_validate_amount() {
        assert!(PaymentLedger::validate_amount(usd(1)).is_ok());
        assert_eq!(
            PaymentLedger::validate_amount(usd(0)),
            Err(PaymentError::NonPositiveAmount)
        );
        assert_eq!(
            PaymentLedger::validate_amount(usd(-100)),
            Err(PaymentError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_validate_initial_status() {
        assert!(PaymentLedger::validate_initial_status(PaymentStatus::Pending).is_ok());
        assert!(PaymentLedger::validate_initial_status(PaymentStatus::Completed).is_ok());
        assert!(PaymentLedger::validate_initial_status(PaymentStatus::Failed).is_ok());
        assert_eq!(
            PaymentLedger::validate_initial_status(PaymentStatus::Refunded),
            Err(PaymentError::InvalidInitialStatus(PaymentStatus::Refunded))
        );
    }

    #[test]
    fn test_validate_against_balance_exact() {
        // Paying the balance exactly is allowed
        assert!(PaymentLedger::validate_against_balance(usd(6000), usd(6000), usd(0)).is_ok());
    }

    #[test]
    fn test_validate_against_balance_overpayment() {
        let result = PaymentLedger::validate_against_balance(usd(6001), usd(6000), usd(0));
        assert_eq!(
            result,
            Err(PaymentError::Overpayment {
                attempted: usd(6001),
                balance_due: usd(6000),
            })
        );
    }

    #[test]
    fn test_validate_against_balance_with_tolerance() {
        // A small configured tolerance admits the payment
        assert!(PaymentLedger::validate_against_balance(usd(6001), usd(6000), usd(1)).is_ok());
        assert!(PaymentLedger::validate_against_balance(usd(6002), usd(6000), usd(1)).is_err());
    }

    #[test]
    fn test_validate_transition() {
        assert!(
            PaymentLedger::validate_transition(PaymentStatus::Pending, PaymentStatus::Completed)
                .is_ok()
        );
        assert_eq!(
            PaymentLedger::validate_transition(PaymentStatus::Refunded, PaymentStatus::Completed),
            Err(PaymentError::InvalidStatusTransition {
                from: PaymentStatus::Refunded,
                to: PaymentStatus::Completed,
            })
        );
    }
}
