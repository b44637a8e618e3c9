//! Lifecycle error types.
//!
//! Every refused transition reports the specific guard that was not met;
//! the engine never silently ignores an event.

use thiserror::Error;

use crate::lifecycle::types::InvoiceStatus;

/// Errors that can occur during lifecycle transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: InvoiceStatus,
        /// The attempted target status.
        to: InvoiceStatus,
    },

    /// Cannot send an invoice with zero line items.
    #[error("Cannot send invoice with zero line items")]
    NoLineItems,

    /// Cannot send an invoice with a zero subtotal.
    #[error("Cannot send invoice with zero subtotal")]
    ZeroSubtotal,

    /// The client has no recipient address to send to.
    #[error("Client has no recipient email address")]
    MissingRecipient,

    /// Payments are not accepted in the current status.
    #[error("Payments cannot be recorded on a {0} invoice")]
    PaymentNotAllowed(InvoiceStatus),

    /// Cancellation is blocked by completed payments.
    #[error("Cannot cancel an invoice with completed payments; refund them first")]
    CancelWithPayments,
}

impl LifecycleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NoLineItems => "NO_LINE_ITEMS",
            Self::ZeroSubtotal => "ZERO_SUBTOTAL",
            Self::MissingRecipient => "MISSING_RECIPIENT",
            Self::PaymentNotAllowed(_) => "PAYMENT_NOT_ALLOWED",
            Self::CancelWithPayments => "CANCEL_WITH_PAYMENTS",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        // Every refused transition is a business-rule violation
        match self {
            Self::InvalidTransition { .. }
            | Self::NoLineItems
            | Self::ZeroSubtotal
            | Self::MissingRecipient
            | Self::PaymentNotAllowed(_)
            | Self::CancelWithPayments => 422,
        }
    }
}
