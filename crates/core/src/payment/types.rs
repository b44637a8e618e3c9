//! Payment domain types.

use chrono::{DateTime, Utc};
use facture_shared::types::{Money, PaymentId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit or debit card.
    Card,
    /// Bank transfer.
    BankTransfer,
    /// Cash.
    Cash,
    /// Paper check.
    Check,
    /// Anything else (recorded for display only).
    Other,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Cash => "cash",
            Self::Check => "check",
            Self::Other => "other",
        }
    }

    /// Parses a method from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "card" => Some(Self::Card),
            "bank_transfer" => Some(Self::BankTransfer),
            "cash" => Some(Self::Cash),
            "check" => Some(Self::Check),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing status of a payment.
///
/// Only `Completed` payments count toward the invoice's paid amount; a
/// `Refunded` payment stops counting the moment its status changes.
/// Valid transitions:
/// - Pending → Processing, Completed, Failed, Cancelled
/// - Processing → Completed, Failed
/// - Completed → Refunded
/// - Failed, Refunded, Cancelled are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Recorded but not yet handed to a processor.
    Pending,
    /// In flight at the payment processor.
    Processing,
    /// Settled; counts toward the paid amount.
    Completed,
    /// The processor rejected the payment (terminal).
    Failed,
    /// A completed payment returned to the payer (terminal).
    Refunded,
    /// Withdrawn before processing (terminal).
    Cancelled,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            "REFUNDED" => Some(Self::Refunded),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Refunded | Self::Cancelled)
    }

    /// Returns true if the payment counts toward the paid amount.
    #[must_use]
    pub const fn counts_toward_paid(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if `self → to` is a permitted status transition.
    #[must_use]
    pub const fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (
                Self::Pending,
                Self::Processing | Self::Completed | Self::Failed | Self::Cancelled
            ) | (Self::Processing, Self::Completed | Self::Failed)
                | (Self::Completed, Self::Refunded)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payment recorded against an invoice.
///
/// Owned by its invoice; amount and method are fixed at creation, only the
/// status moves (per [`PaymentStatus::can_transition`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// The amount paid, in the invoice currency.
    pub amount: Money,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Current processing status.
    pub status: PaymentStatus,
    /// When the payment was received.
    pub payment_date: DateTime<Utc>,
    /// Provider-side transaction reference, if any.
    pub external_reference: Option<String>,
}
