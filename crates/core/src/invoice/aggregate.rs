//! The invoice aggregate.
//!
//! Composes line items, charge calculation, the payment ledger, and the
//! lifecycle engine behind a set of mutation operations. Every operation
//! validates first and applies second, then re-runs the full derivation
//! pipeline (subtotal → charges → ledger → status) and bumps the version,
//! so derived fields can never drift from the inputs that produced them.

use chrono::{DateTime, NaiveDate, Utc};
use facture_shared::types::{
    ClientId, Currency, InvoiceId, LineItemId, Money, MoneyError, PaymentId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::error::InvoiceError;
use crate::invoice::totals::InvoiceTotals;
use crate::invoice::types::{DiscountSpec, LineItem, LineItemInput};
use crate::lifecycle::{InvoiceStatus, LifecycleEngine};
use crate::payment::{Payment, PaymentLedger, PaymentMethod, PaymentStatus};

/// Input for creating a new invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// The client being billed.
    pub client_id: ClientId,
    /// Invoice number; generated from the ID when omitted.
    pub number: Option<String>,
    /// Invoice currency, fixed for the invoice's lifetime.
    pub currency: Currency,
    /// Issue date.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Tax rate on a 0-100 scale.
    pub tax_rate: Decimal,
    /// Discount to apply to the subtotal.
    pub discount: DiscountSpec,
    /// Initial line items (may be empty while drafting).
    pub line_items: Vec<LineItemInput>,
    /// Free-text notes shown on the invoice.
    pub notes: Option<String>,
    /// Payment terms text.
    pub terms: Option<String>,
}

/// An invoice: stored inputs, payments, status, and derived totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier.
    pub id: InvoiceId,
    /// The client being billed.
    pub client_id: ClientId,
    /// Human-facing invoice number.
    pub number: String,
    /// Invoice currency (fixed at creation).
    pub currency: Currency,
    /// Issue date.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Tax rate on a 0-100 scale.
    pub tax_rate: Decimal,
    /// Discount applied to the subtotal.
    pub discount: DiscountSpec,
    /// Ordered line items (order matters for display, not totals).
    pub line_items: Vec<LineItem>,
    /// Payments recorded against this invoice.
    pub payments: Vec<Payment>,
    /// Current stored status (`Overdue` is projected at read time).
    pub status: InvoiceStatus,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Payment terms text.
    pub terms: Option<String>,
    /// Derived monetary figures, recomputed inside every mutation.
    pub totals: InvoiceTotals,
    /// When the invoice was first sent.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the recipient last opened the invoice.
    pub viewed_at: Option<DateTime<Utc>>,
    /// When the invoice was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency token, bumped on every mutation.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

fn validate_tax_rate(rate: Decimal) -> Result<(), InvoiceError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(InvoiceError::InvalidTaxRate(rate));
    }
    Ok(())
}

fn validate_date_range(
    invoice_date: NaiveDate,
    due_date: NaiveDate,
) -> Result<(), InvoiceError> {
    if due_date < invoice_date {
        return Err(InvoiceError::InvalidDateRange {
            invoice_date,
            due_date,
        });
    }
    Ok(())
}

impl Invoice {
    /// Creates a new draft invoice.
    pub fn create(input: CreateInvoiceInput) -> Result<Self, InvoiceError> {
        validate_tax_rate(input.tax_rate)?;
        input.discount.validate()?;
        validate_date_range(input.invoice_date, input.due_date)?;

        let line_items = input
            .line_items
            .iter()
            .map(|item| item.validate(input.currency))
            .collect::<Result<Vec<_>, _>>()?;

        let totals = InvoiceTotals::compute(
            &line_items,
            input.tax_rate,
            &input.discount,
            &[],
            input.currency,
        )?;

        let id = InvoiceId::new();
        let number = input
            .number
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                let uuid = id.into_inner().simple().to_string();
                format!("INV-{}", uuid[..8].to_uppercase())
            });

        let now = Utc::now();
        Ok(Self {
            id,
            client_id: input.client_id,
            number,
            currency: input.currency,
            invoice_date: input.invoice_date,
            due_date: input.due_date,
            tax_rate: input.tax_rate,
            discount: input.discount,
            line_items,
            payments: Vec::new(),
            status: InvoiceStatus::Draft,
            notes: input.notes,
            terms: input.terms,
            totals,
            sent_at: None,
            viewed_at: None,
            cancelled_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Re-runs the full derivation pipeline from the authoritative inputs.
    ///
    /// Idempotent: recomputing twice from the same inputs yields identical
    /// results. Public so callers can validate stored snapshots against
    /// their inputs.
    pub fn recompute(&mut self) -> Result<(), InvoiceError> {
        self.totals = InvoiceTotals::compute(
            &self.line_items,
            self.tax_rate,
            &self.discount,
            &self.payments,
            self.currency,
        )?;

        if !matches!(self.status, InvoiceStatus::Draft | InvoiceStatus::Cancelled) {
            self.status = LifecycleEngine::derive_payment_state(
                self.status,
                self.totals.paid_amount,
                self.totals.total_amount,
                self.viewed_at.is_some(),
            )?;
        }
        Ok(())
    }

    /// The status to report for the given date, with the overdue
    /// projection applied.
    #[must_use]
    pub fn status_as_of(&self, today: NaiveDate) -> InvoiceStatus {
        LifecycleEngine::project(self.status, self.totals.balance_due, self.due_date, today)
    }

    /// Number of payments currently in `Completed` status.
    #[must_use]
    pub fn completed_payment_count(&self) -> usize {
        PaymentLedger::completed_count(&self.payments)
    }

    fn ensure_editable(&self) -> Result<(), InvoiceError> {
        if LifecycleEngine::is_editable(self.status, !self.payments.is_empty()) {
            Ok(())
        } else {
            Err(InvoiceError::NotEditable(self.status))
        }
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Appends a line item.
    pub fn add_line_item(&mut self, input: &LineItemInput) -> Result<LineItemId, InvoiceError> {
        self.ensure_editable()?;
        let item = input.validate(self.currency)?;
        let id = item.id;
        self.line_items.push(item);
        self.recompute()?;
        self.touch();
        Ok(id)
    }

    /// Removes a line item by ID.
    pub fn remove_line_item(&mut self, id: LineItemId) -> Result<(), InvoiceError> {
        self.ensure_editable()?;
        let index = self
            .line_items
            .iter()
            .position(|item| item.id == id)
            .ok_or(InvoiceError::LineItemNotFound(id))?;
        self.line_items.remove(index);
        self.recompute()?;
        self.touch();
        Ok(())
    }

    /// Replaces the whole line item list (edit-screen form submission).
    pub fn replace_line_items(&mut self, inputs: &[LineItemInput]) -> Result<(), InvoiceError> {
        self.ensure_editable()?;
        let items = inputs
            .iter()
            .map(|input| input.validate(self.currency))
            .collect::<Result<Vec<_>, _>>()?;
        self.line_items = items;
        self.recompute()?;
        self.touch();
        Ok(())
    }

    /// Sets the tax rate (0-100).
    pub fn set_tax_rate(&mut self, rate: Decimal) -> Result<(), InvoiceError> {
        self.ensure_editable()?;
        validate_tax_rate(rate)?;
        self.tax_rate = rate;
        self.recompute()?;
        self.touch();
        Ok(())
    }

    /// Sets the discount.
    pub fn set_discount(&mut self, discount: DiscountSpec) -> Result<(), InvoiceError> {
        self.ensure_editable()?;
        discount.validate()?;
        self.discount = discount;
        self.recompute()?;
        self.touch();
        Ok(())
    }

    /// Sets the free-text notes.
    pub fn set_notes(&mut self, notes: Option<String>) -> Result<(), InvoiceError> {
        self.ensure_editable()?;
        self.notes = notes;
        self.touch();
        Ok(())
    }

    /// Sets the payment terms text.
    pub fn set_terms(&mut self, terms: Option<String>) -> Result<(), InvoiceError> {
        self.ensure_editable()?;
        self.terms = terms;
        self.touch();
        Ok(())
    }

    /// Sets the issue date (full edit rule applies).
    pub fn set_invoice_date(&mut self, date: NaiveDate) -> Result<(), InvoiceError> {
        self.ensure_editable()?;
        validate_date_range(date, self.due_date)?;
        self.invoice_date = date;
        self.touch();
        Ok(())
    }

    /// Corrects the due date.
    ///
    /// Allowed on any non-terminal status so an overdue invoice's dates can
    /// be fixed; the overdue projection reverses on the next read.
    pub fn set_due_date(&mut self, date: NaiveDate) -> Result<(), InvoiceError> {
        if self.status.is_terminal() {
            return Err(InvoiceError::NotEditable(self.status));
        }
        validate_date_range(self.invoice_date, date)?;
        self.due_date = date;
        self.touch();
        Ok(())
    }

    /// Sends the invoice to the given recipient address.
    pub fn send(&mut self, recipient_email: &str) -> Result<(), InvoiceError> {
        self.status = LifecycleEngine::send(
            self.status,
            self.line_items.len(),
            self.totals.subtotal,
            recipient_email,
        )?;
        self.sent_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Records that the recipient opened the invoice.
    pub fn record_view(&mut self) -> Result<(), InvoiceError> {
        self.status = LifecycleEngine::record_view(self.status)?;
        self.viewed_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Records a payment against this invoice.
    ///
    /// `tolerance` is the configured overpayment allowance (zero for strict
    /// rejection at the balance due). Returns the new payment's ID.
    pub fn record_payment(
        &mut self,
        amount: Money,
        method: PaymentMethod,
        initial_status: PaymentStatus,
        external_reference: Option<String>,
        tolerance: Money,
    ) -> Result<PaymentId, InvoiceError> {
        LifecycleEngine::validate_payment_allowed(self.status)?;
        if amount.currency() != self.currency {
            return Err(InvoiceError::Money(MoneyError::CurrencyMismatch {
                expected: self.currency,
                actual: amount.currency(),
            }));
        }
        PaymentLedger::validate_amount(amount)?;
        PaymentLedger::validate_initial_status(initial_status)?;
        if initial_status.counts_toward_paid() {
            PaymentLedger::validate_against_balance(amount, self.totals.balance_due, tolerance)?;
        }

        let payment = Payment {
            id: PaymentId::new(),
            amount,
            method,
            status: initial_status,
            payment_date: Utc::now(),
            external_reference,
        };
        let id = payment.id;
        self.payments.push(payment);
        self.recompute()?;
        self.touch();
        Ok(id)
    }

    /// Transitions a payment's status (completion, failure, refund).
    pub fn update_payment_status(
        &mut self,
        payment_id: PaymentId,
        new_status: PaymentStatus,
        tolerance: Money,
    ) -> Result<(), InvoiceError> {
        let index = self
            .payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or(crate::payment::PaymentError::PaymentNotFound(payment_id))?;

        let current = self.payments[index].status;
        PaymentLedger::validate_transition(current, new_status)?;
        if new_status.counts_toward_paid() {
            // Completing a held payment re-runs the overpayment guard: the
            // balance may have moved since the payment was recorded.
            LifecycleEngine::validate_payment_allowed(self.status)?;
            PaymentLedger::validate_against_balance(
                self.payments[index].amount,
                self.totals.balance_due,
                tolerance,
            )?;
        }

        self.payments[index].status = new_status;
        self.recompute()?;
        self.touch();
        Ok(())
    }

    /// Cancels the invoice.
    pub fn cancel(&mut self) -> Result<(), InvoiceError> {
        self.status = LifecycleEngine::cancel(self.status, self.completed_payment_count())?;
        self.cancelled_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Validates that the invoice may be deleted.
    pub fn ensure_deletable(&self) -> Result<(), InvoiceError> {
        if self.completed_payment_count() > 0 {
            return Err(InvoiceError::HasCompletedPayments);
        }
        Ok(())
    }

    /// Creates a fresh draft copying this invoice's billable content.
    ///
    /// The escape hatch once an invoice is no longer editable: same items,
    /// tax, discount, and currency; new identity, new dates, no payments.
    pub fn duplicate(
        &self,
        number: Option<String>,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<Self, InvoiceError> {
        Self::create(CreateInvoiceInput {
            client_id: self.client_id,
            number,
            currency: self.currency,
            invoice_date,
            due_date,
            tax_rate: self.tax_rate,
            discount: self.discount,
            line_items: self
                .line_items
                .iter()
                .map(|item| LineItemInput {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    rate: item.rate.to_decimal(),
                })
                .collect(),
            notes: self.notes.clone(),
            terms: self.terms.clone(),
        })
    }
}
