//! Payment records and the payment ledger.
//!
//! # Modules
//!
//! - `types` - `Payment`, `PaymentMethod`, `PaymentStatus`
//! - `error` - Payment-specific error types
//! - `ledger` - Paid-amount/balance-due derivation and recording guards

pub mod error;
pub mod ledger;
pub mod types;

#[cfg(test)]
mod ledger_props;

pub use error::PaymentError;
pub use ledger::PaymentLedger;
pub use types::{Payment, PaymentMethod, PaymentStatus};
