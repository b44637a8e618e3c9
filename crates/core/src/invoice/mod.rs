//! Invoice domain logic.
//!
//! This module implements the financial core of an invoice:
//! - Line items and discount specifications with input validation
//! - Charge calculation (subtotal, tax, discount, total)
//! - The invoice aggregate, which keeps stored inputs and derived figures
//!   consistent under every mutation
//! - Error types for invoice operations

pub mod aggregate;
pub mod error;
pub mod totals;
pub mod types;

#[cfg(test)]
mod totals_props;

pub use aggregate::{CreateInvoiceInput, Invoice};
pub use error::InvoiceError;
pub use totals::{Charges, InvoiceTotals};
pub use types::{DiscountKind, DiscountSpec, LineItem, LineItemInput};
