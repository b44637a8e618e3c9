//! Payment error types.

use facture_shared::types::{Money, PaymentId};
use thiserror::Error;

use crate::payment::types::PaymentStatus;

/// Errors that can occur while recording or updating payments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// Payment amount must be positive.
    #[error("Payment amount must be positive")]
    NonPositiveAmount,

    /// Recording the payment would exceed the balance due.
    #[error("Payment of {attempted} exceeds the balance due of {balance_due}")]
    Overpayment {
        /// The attempted payment amount.
        attempted: Money,
        /// The outstanding balance at the time of recording.
        balance_due: Money,
    },

    /// A payment cannot be created in the requested status.
    #[error("A payment cannot be recorded with initial status {0}")]
    InvalidInitialStatus(PaymentStatus),

    /// Attempted an invalid payment status transition.
    #[error("Invalid payment status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: PaymentStatus,
        /// The attempted target status.
        to: PaymentStatus,
    },

    /// Payment not found on this invoice.
    #[error("Payment {0} not found")]
    PaymentNotFound(PaymentId),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::InvalidInitialStatus(_) => "INVALID_INITIAL_STATUS",
            Self::InvalidStatusTransition { .. } => "INVALID_PAYMENT_TRANSITION",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount | Self::InvalidInitialStatus(_) => 400,
            Self::Overpayment { .. } | Self::InvalidStatusTransition { .. } => 422,
            Self::PaymentNotFound(_) => 404,
        }
    }
}
