//! Invoice status domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Invoice status in the billing lifecycle.
///
/// Stored statuses progress through these states from creation to payment.
/// The valid transitions are:
/// - Draft → Sent (send)
/// - Sent → Viewed (recipient view)
/// - Sent/Viewed → PartiallyPaid/Paid (completed payment)
/// - Paid → PartiallyPaid (refund)
/// - any except Paid → Cancelled (cancel, no completed payments)
///
/// `Overdue` is never stored: it is a read-time projection over an unpaid
/// invoice past its due date (see [`crate::lifecycle::LifecycleEngine::project`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Invoice is being drafted and can be modified freely.
    Draft,
    /// Invoice has been sent to the client.
    Sent,
    /// The recipient has opened the invoice.
    Viewed,
    /// Some, but not all, of the total has been paid.
    PartiallyPaid,
    /// The total has been paid in full (terminal).
    Paid,
    /// Unpaid and past the due date (projection only, never stored).
    Overdue,
    /// Invoice has been cancelled (terminal).
    Cancelled,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Sent => "SENT",
            Self::Viewed => "VIEWED",
            Self::PartiallyPaid => "PARTIALLY_PAID",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "SENT" => Some(Self::Sent),
            "VIEWED" => Some(Self::Viewed),
            "PARTIALLY_PAID" => Some(Self::PartiallyPaid),
            "PAID" => Some(Self::Paid),
            "OVERDUE" => Some(Self::Overdue),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further business transition is expected.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Returns true if payments may be recorded in this status.
    ///
    /// A paid invoice still accepts the recording attempt so that the
    /// ledger can refuse it as an overpayment rather than a status error.
    #[must_use]
    pub const fn accepts_payments(self) -> bool {
        !matches!(self, Self::Draft | Self::Cancelled)
    }

    /// Returns true if the status is subject to the overdue projection.
    #[must_use]
    pub const fn can_become_overdue(self) -> bool {
        matches!(self, Self::Sent | Self::Viewed | Self::PartiallyPaid)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
