//! Lifecycle engine for invoice status transitions.
//!
//! This module implements the core state machine logic. All methods are
//! stateless associated functions: they validate a transition against the
//! current status and the relevant guards, and return the new status or the
//! specific guard that failed. The engine never mutates state itself and
//! never auto-corrects a status.

use chrono::NaiveDate;
use facture_shared::types::Money;

use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::types::InvoiceStatus;

/// Stateless service for invoice status transitions.
pub struct LifecycleEngine;

impl LifecycleEngine {
    /// Send a draft invoice to its recipient.
    ///
    /// Guards: at least one line item, a positive subtotal, and a non-empty
    /// recipient email on the client.
    ///
    /// # Errors
    ///
    /// Returns the specific unmet guard, or `InvalidTransition` when the
    /// invoice is not in `Draft`.
    pub fn send(
        current: InvoiceStatus,
        line_item_count: usize,
        subtotal: Money,
        recipient_email: &str,
    ) -> Result<InvoiceStatus, LifecycleError> {
        if current != InvoiceStatus::Draft {
            return Err(LifecycleError::InvalidTransition {
                from: current,
                to: InvoiceStatus::Sent,
            });
        }
        if line_item_count == 0 {
            return Err(LifecycleError::NoLineItems);
        }
        if !subtotal.is_positive() {
            return Err(LifecycleError::ZeroSubtotal);
        }
        if recipient_email.trim().is_empty() {
            return Err(LifecycleError::MissingRecipient);
        }
        Ok(InvoiceStatus::Sent)
    }

    /// Record that the recipient opened the invoice.
    ///
    /// `Sent` advances to `Viewed`; a repeat view, or a view of an invoice
    /// that has already progressed further, leaves the status unchanged.
    /// Viewing an unsent or cancelled invoice is refused.
    pub fn record_view(current: InvoiceStatus) -> Result<InvoiceStatus, LifecycleError> {
        match current {
            InvoiceStatus::Draft | InvoiceStatus::Cancelled => {
                Err(LifecycleError::InvalidTransition {
                    from: current,
                    to: InvoiceStatus::Viewed,
                })
            }
            InvoiceStatus::Sent => Ok(InvoiceStatus::Viewed),
            other => Ok(other),
        }
    }

    /// Validate that a payment may be recorded in the current status.
    pub fn validate_payment_allowed(current: InvoiceStatus) -> Result<(), LifecycleError> {
        if current.accepts_payments() {
            Ok(())
        } else {
            Err(LifecycleError::PaymentNotAllowed(current))
        }
    }

    /// Re-derive the payment-progress status after a ledger change.
    ///
    /// Applied whenever a completed payment is recorded or refunded. The
    /// rule is symmetric: full payment reaches `Paid`, partial payment
    /// reaches `PartiallyPaid`, and a refund back to zero returns to
    /// `Viewed` or `Sent` depending on the view history. This is what makes
    /// refund-then-cancel reachable without a dedicated event.
    pub fn derive_payment_state(
        current: InvoiceStatus,
        paid: Money,
        total: Money,
        has_been_viewed: bool,
    ) -> Result<InvoiceStatus, LifecycleError> {
        match current {
            InvoiceStatus::Draft | InvoiceStatus::Cancelled => {
                Err(LifecycleError::InvalidTransition {
                    from: current,
                    to: InvoiceStatus::PartiallyPaid,
                })
            }
            _ => {
                let status = if total.is_positive()
                    && paid.minor_units() >= total.minor_units()
                {
                    InvoiceStatus::Paid
                } else if paid.is_positive() {
                    InvoiceStatus::PartiallyPaid
                } else if has_been_viewed {
                    InvoiceStatus::Viewed
                } else {
                    InvoiceStatus::Sent
                };
                Ok(status)
            }
        }
    }

    /// Cancel an invoice.
    ///
    /// Allowed from any status except `Paid` and `Cancelled`, and only
    /// while no completed payment exists (refund first).
    pub fn cancel(
        current: InvoiceStatus,
        completed_payments: usize,
    ) -> Result<InvoiceStatus, LifecycleError> {
        if current.is_terminal() {
            return Err(LifecycleError::InvalidTransition {
                from: current,
                to: InvoiceStatus::Cancelled,
            });
        }
        if completed_payments > 0 {
            return Err(LifecycleError::CancelWithPayments);
        }
        Ok(InvoiceStatus::Cancelled)
    }

    /// Project the read-time status, overlaying `Overdue` on an unpaid
    /// invoice past its due date.
    ///
    /// Pure function of its inputs: nothing is stored, so a payment or a
    /// due-date correction reverses the projection with no explicit
    /// "un-overdue" event.
    #[must_use]
    pub fn project(
        status: InvoiceStatus,
        balance_due: Money,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> InvoiceStatus {
        if status.can_become_overdue() && balance_due.is_positive() && today > due_date {
            InvoiceStatus::Overdue
        } else {
            status
        }
    }

    /// Returns true if invoice inputs (line items, tax, discount, dates)
    /// may still be edited.
    ///
    /// Editable in `Draft`, and in `Sent` only until the first view or
    /// payment event; a view moves the status to `Viewed`, so `Sent` plus
    /// "no payment events" is the whole window.
    #[must_use]
    pub fn is_editable(status: InvoiceStatus, has_payment_events: bool) -> bool {
        match status {
            InvoiceStatus::Draft => true,
            InvoiceStatus::Sent => !has_payment_events,
            _ => false,
        }
    }
}
