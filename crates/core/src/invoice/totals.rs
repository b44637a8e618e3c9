//! Charge calculation: subtotal, tax, discount, total, and ledger figures.
//!
//! All functions here are pure projections of their inputs. Tax is always
//! computed on the pre-discount subtotal; this ordering is a fixed design
//! decision, not configurable. Each figure is rounded half-to-even exactly
//! once, on the minor-unit result.

use facture_shared::types::{Currency, Money, MoneyError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::types::{DiscountKind, DiscountSpec, LineItem};
use crate::payment::ledger::PaymentLedger;
use crate::payment::types::Payment;

/// The charge figures derived from a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charges {
    /// Tax on the pre-discount subtotal.
    pub tax_amount: Money,
    /// Effective discount (capped at the subtotal).
    pub discount_amount: Money,
    /// `subtotal + tax - discount`, floored at zero.
    pub total_amount: Money,
}

/// All derived monetary figures of an invoice.
///
/// Never stored ahead of its inputs: recomputed from line items, tax rate,
/// discount, and payments inside every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line amounts.
    pub subtotal: Money,
    /// Tax on the subtotal.
    pub tax_amount: Money,
    /// Effective discount.
    pub discount_amount: Money,
    /// Amount owed before payments.
    pub total_amount: Money,
    /// Sum of completed payments.
    pub paid_amount: Money,
    /// Outstanding balance, clamped at zero.
    pub balance_due: Money,
}

impl InvoiceTotals {
    /// All-zero totals in the given currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        Self {
            subtotal: zero,
            tax_amount: zero,
            discount_amount: zero,
            total_amount: zero,
            paid_amount: zero,
            balance_due: zero,
        }
    }

    /// Recomputes every derived figure from the authoritative inputs.
    pub fn compute(
        items: &[LineItem],
        tax_rate: Decimal,
        discount: &DiscountSpec,
        payments: &[Payment],
        currency: Currency,
    ) -> Result<Self, MoneyError> {
        let subtotal = subtotal(items, currency)?;
        let charges = charges(subtotal, tax_rate, discount)?;
        let paid_amount = PaymentLedger::paid_amount(payments, currency)?;
        let balance_due = PaymentLedger::balance_due(charges.total_amount, paid_amount)?;

        Ok(Self {
            subtotal,
            tax_amount: charges.tax_amount,
            discount_amount: charges.discount_amount,
            total_amount: charges.total_amount,
            paid_amount,
            balance_due,
        })
    }
}

/// Sums the per-item amounts of an ordered line item sequence.
///
/// Each item's amount rounds once (`quantity x rate`); the sum itself is
/// exact integer arithmetic on minor units. An empty sequence yields zero,
/// which is permitted while editing and refused by the send guard.
pub fn subtotal(items: &[LineItem], currency: Currency) -> Result<Money, MoneyError> {
    let mut sum = Money::zero(currency);
    for item in items {
        sum = sum.try_add(item.amount()?)?;
    }
    Ok(sum)
}

/// Applies a tax rate and a discount to a subtotal.
pub fn charges(
    subtotal: Money,
    tax_rate: Decimal,
    discount: &DiscountSpec,
) -> Result<Charges, MoneyError> {
    let tax_amount = subtotal.percent(tax_rate)?;

    let discount_amount = match discount.kind {
        DiscountKind::Fixed => {
            let requested = Money::from_decimal(discount.value, subtotal.currency())?;
            if requested.minor_units() > subtotal.minor_units() {
                subtotal
            } else if requested.is_negative() {
                Money::zero(subtotal.currency())
            } else {
                requested
            }
        }
        DiscountKind::Percentage => {
            let rate = discount.value.min(Decimal::ONE_HUNDRED).max(Decimal::ZERO);
            subtotal.percent(rate)?
        }
    };

    let total_amount = subtotal
        .try_add(tax_amount)?
        .saturating_sub(discount_amount)?;

    Ok(Charges {
        tax_amount,
        discount_amount,
        total_amount,
    })
}
