//! Invoice error types.
//!
//! This module defines all errors that can occur during invoice operations:
//! input validation, edit-permission and deletion invariants, optimistic
//! concurrency conflicts, and wrapped lifecycle/payment/money errors.

use facture_shared::types::{InvoiceId, LineItemId, MoneyError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::lifecycle::LifecycleError;
use crate::lifecycle::types::InvoiceStatus;
use crate::payment::PaymentError;

/// Errors that can occur during invoice operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    // ========== Validation Errors ==========
    /// Line item description cannot be empty.
    #[error("Line item description cannot be empty")]
    EmptyDescription,

    /// Line item quantity must be positive.
    #[error("Line item quantity must be positive")]
    NonPositiveQuantity,

    /// Line item rate cannot be negative.
    #[error("Line item rate cannot be negative")]
    NegativeRate,

    /// Tax rate must be between 0 and 100.
    #[error("Tax rate must be between 0 and 100, got {0}")]
    InvalidTaxRate(Decimal),

    /// Discount value cannot be negative.
    #[error("Discount value cannot be negative")]
    NegativeDiscountValue,

    /// Due date cannot precede the invoice date.
    #[error("Due date {due_date} precedes invoice date {invoice_date}")]
    InvalidDateRange {
        /// The invoice issue date.
        invoice_date: chrono::NaiveDate,
        /// The attempted due date.
        due_date: chrono::NaiveDate,
    },

    // ========== Invariant Violations ==========
    /// The invoice can no longer be edited.
    #[error("A {0} invoice can no longer be edited; duplicate it instead")]
    NotEditable(InvoiceStatus),

    /// Line item not found on this invoice.
    #[error("Line item {0} not found")]
    LineItemNotFound(LineItemId),

    /// Deletion is blocked by completed payments.
    #[error("Cannot delete an invoice with recorded payments")]
    HasCompletedPayments,

    // ========== Concurrency Errors ==========
    /// Invoice version mismatch (stale read).
    #[error("Invoice version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The version the caller expected.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },

    /// Invoice not found.
    #[error("Invoice {0} not found")]
    NotFound(InvoiceId),

    // ========== Wrapped Domain Errors ==========
    /// A lifecycle transition was refused.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// A payment operation was refused.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Money arithmetic failed (currency mismatch or overflow).
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl InvoiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            Self::NegativeRate => "NEGATIVE_RATE",
            Self::InvalidTaxRate(_) => "INVALID_TAX_RATE",
            Self::NegativeDiscountValue => "NEGATIVE_DISCOUNT_VALUE",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::NotEditable(_) => "NOT_EDITABLE",
            Self::LineItemNotFound(_) => "LINE_ITEM_NOT_FOUND",
            Self::HasCompletedPayments => "HAS_COMPLETED_PAYMENTS",
            Self::VersionMismatch { .. } => "VERSION_MISMATCH",
            Self::NotFound(_) => "INVOICE_NOT_FOUND",
            Self::Lifecycle(e) => e.error_code(),
            Self::Payment(e) => e.error_code(),
            Self::Money(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::EmptyDescription
            | Self::NonPositiveQuantity
            | Self::NegativeRate
            | Self::InvalidTaxRate(_)
            | Self::NegativeDiscountValue
            | Self::InvalidDateRange { .. } => 400,

            // 422 Unprocessable - invariant violations
            Self::NotEditable(_) | Self::HasCompletedPayments => 422,

            // 404 Not Found
            Self::LineItemNotFound(_) | Self::NotFound(_) => 404,

            // 409 Conflict - concurrency errors
            Self::VersionMismatch { .. } => 409,

            Self::Lifecycle(e) => e.http_status_code(),
            Self::Payment(e) => e.http_status_code(),

            // 500 Internal Server Error - arithmetic invariant breach
            Self::Money(_) => 500,
        }
    }

    /// Returns true if this error is retryable after a fresh read.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionMismatch { .. })
    }
}
