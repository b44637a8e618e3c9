//! Invoice management routes.
//!
//! Monetary amounts cross the wire as decimal strings to keep the JSON
//! representation exact; parsing happens here, before any domain operation
//! runs. Every response carries the invoice snapshot with the overdue
//! projection applied for the current date.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::routes::{app_error, domain_error};
use facture_core::invoice::{
    CreateInvoiceInput, DiscountKind, DiscountSpec, Invoice, LineItemInput,
};
use facture_core::lifecycle::InvoiceStatus;
use facture_core::payment::{PaymentMethod, PaymentStatus};
use facture_shared::AppError;
use facture_shared::types::{ClientId, Currency, InvoiceId, Money, PaymentId};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}", patch(update_invoice))
        .route("/invoices/{invoice_id}", delete(delete_invoice))
        .route("/invoices/{invoice_id}/send", post(send_invoice))
        .route("/invoices/{invoice_id}/view", post(record_view))
        .route("/invoices/{invoice_id}/cancel", post(cancel_invoice))
        .route("/invoices/{invoice_id}/duplicate", post(duplicate_invoice))
        .route("/invoices/{invoice_id}/payments", post(record_payment))
        .route(
            "/invoices/{invoice_id}/payments/{payment_id}",
            patch(update_payment),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by projected status.
    pub status: Option<String>,
    /// Filter by client.
    pub client_id: Option<Uuid>,
}

/// Request body for a line item.
#[derive(Debug, Deserialize)]
pub struct LineItemRequest {
    /// What is being billed.
    pub description: String,
    /// Quantity (decimal string).
    pub quantity: String,
    /// Unit price in major units (decimal string).
    pub rate: String,
}

/// Request body for a discount.
#[derive(Debug, Deserialize)]
pub struct DiscountRequest {
    /// "FIXED" or "PERCENTAGE".
    #[serde(rename = "type")]
    pub kind: String,
    /// The discount value (decimal string).
    pub value: String,
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// The client being billed.
    pub client_id: Uuid,
    /// Invoice number; generated when omitted.
    pub number: Option<String>,
    /// ISO 4217 currency; configured default when omitted.
    pub currency: Option<String>,
    /// Issue date; today when omitted.
    pub invoice_date: Option<NaiveDate>,
    /// Due date; issue date plus the configured terms when omitted.
    pub due_date: Option<NaiveDate>,
    /// Tax rate 0-100 (decimal string); configured default when omitted.
    pub tax_rate: Option<String>,
    /// Discount; none when omitted.
    pub discount: Option<DiscountRequest>,
    /// Line items (may be empty while drafting).
    #[serde(default)]
    pub line_items: Vec<LineItemRequest>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Payment terms text.
    pub terms: Option<String>,
}

/// Request body for updating an invoice.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    /// Version the caller read; the write is refused if stale.
    pub expected_version: Option<u64>,
    /// New tax rate (decimal string).
    pub tax_rate: Option<String>,
    /// New discount.
    pub discount: Option<DiscountRequest>,
    /// New issue date.
    pub invoice_date: Option<NaiveDate>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// Full replacement for the line item list.
    pub line_items: Option<Vec<LineItemRequest>>,
    /// New notes.
    pub notes: Option<String>,
    /// New terms.
    pub terms: Option<String>,
}

/// Query parameters carrying the optimistic-concurrency token for
/// body-less mutations.
#[derive(Debug, Deserialize)]
pub struct VersionQuery {
    /// Version the caller read; the write is refused if stale.
    pub expected_version: Option<u64>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Payment amount in the invoice currency (decimal string).
    pub amount: String,
    /// Payment method.
    pub method: String,
    /// Initial status; `COMPLETED` when omitted (provider outcome).
    pub status: Option<String>,
    /// Provider-side transaction reference.
    pub external_reference: Option<String>,
    /// Version the caller read; the write is refused if stale.
    pub expected_version: Option<u64>,
}

/// Request body for a payment status transition.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    /// The target status.
    pub status: String,
    /// Version the caller read; the write is refused if stale.
    pub expected_version: Option<u64>,
}

/// Request body for duplicating an invoice.
#[derive(Debug, Default, Deserialize)]
pub struct DuplicateInvoiceRequest {
    /// Number for the copy; generated when omitted.
    pub number: Option<String>,
    /// Issue date for the copy; today when omitted.
    pub invoice_date: Option<NaiveDate>,
    /// Due date for the copy; issue date plus configured terms when omitted.
    pub due_date: Option<NaiveDate>,
}

/// Response for a line item.
#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    /// Line item ID.
    pub id: Uuid,
    /// What is being billed.
    pub description: String,
    /// Quantity.
    pub quantity: String,
    /// Unit price.
    pub rate: String,
    /// Derived line amount.
    pub amount: String,
}

/// Response for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Amount paid.
    pub amount: String,
    /// Payment method.
    pub method: String,
    /// Processing status.
    pub status: String,
    /// When the payment was received.
    pub payment_date: String,
    /// Provider-side transaction reference.
    pub external_reference: Option<String>,
}

/// Response for a discount.
#[derive(Debug, Serialize)]
pub struct DiscountResponse {
    /// "FIXED" or "PERCENTAGE".
    #[serde(rename = "type")]
    pub kind: String,
    /// The discount value.
    pub value: String,
}

/// Response for an invoice snapshot.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// The client being billed.
    pub client_id: Uuid,
    /// Invoice number.
    pub number: String,
    /// Invoice currency.
    pub currency: String,
    /// Status with the overdue projection applied.
    pub status: String,
    /// Issue date.
    pub invoice_date: String,
    /// Due date.
    pub due_date: String,
    /// Tax rate (0-100).
    pub tax_rate: String,
    /// Discount specification.
    pub discount: DiscountResponse,
    /// Line items in display order.
    pub line_items: Vec<LineItemResponse>,
    /// Recorded payments.
    pub payments: Vec<PaymentResponse>,
    /// Sum of line amounts.
    pub subtotal: String,
    /// Tax on the subtotal.
    pub tax_amount: String,
    /// Effective discount.
    pub discount_amount: String,
    /// Amount owed before payments.
    pub total_amount: String,
    /// Sum of completed payments.
    pub paid_amount: String,
    /// Outstanding balance.
    pub balance_due: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Payment terms text.
    pub terms: Option<String>,
    /// Optimistic-concurrency token.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last mutation timestamp.
    pub updated_at: String,
}

fn money_str(amount: Money) -> String {
    amount.to_decimal().to_string()
}

fn invoice_response(invoice: &Invoice, today: NaiveDate) -> Result<InvoiceResponse, AppError> {
    let line_items = invoice
        .line_items
        .iter()
        .map(|item| {
            let amount = item
                .amount()
                .map_err(|e| AppError::Internal(e.to_string()))?;
            Ok(LineItemResponse {
                id: item.id.into_inner(),
                description: item.description.clone(),
                quantity: item.quantity.to_string(),
                rate: money_str(item.rate),
                amount: money_str(amount),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let payments = invoice
        .payments
        .iter()
        .map(|payment| PaymentResponse {
            id: payment.id.into_inner(),
            amount: money_str(payment.amount),
            method: payment.method.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            payment_date: payment.payment_date.to_rfc3339(),
            external_reference: payment.external_reference.clone(),
        })
        .collect();

    Ok(InvoiceResponse {
        id: invoice.id.into_inner(),
        client_id: invoice.client_id.into_inner(),
        number: invoice.number.clone(),
        currency: invoice.currency.to_string(),
        status: invoice.status_as_of(today).as_str().to_string(),
        invoice_date: invoice.invoice_date.to_string(),
        due_date: invoice.due_date.to_string(),
        tax_rate: invoice.tax_rate.to_string(),
        discount: DiscountResponse {
            kind: invoice.discount.kind.as_str().to_string(),
            value: invoice.discount.value.to_string(),
        },
        line_items,
        payments,
        subtotal: money_str(invoice.totals.subtotal),
        tax_amount: money_str(invoice.totals.tax_amount),
        discount_amount: money_str(invoice.totals.discount_amount),
        total_amount: money_str(invoice.totals.total_amount),
        paid_amount: money_str(invoice.totals.paid_amount),
        balance_due: money_str(invoice.totals.balance_due),
        notes: invoice.notes.clone(),
        terms: invoice.terms.clone(),
        version: invoice.version,
        created_at: invoice.created_at.to_rfc3339(),
        updated_at: invoice.updated_at.to_rfc3339(),
    })
}

fn invoice_ok(invoice: &Invoice, status: StatusCode) -> axum::response::Response {
    let today = Utc::now().date_naive();
    match invoice_response(invoice, today) {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => app_error(&e),
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(value)
        .map_err(|_| AppError::Validation(format!("Invalid {field}: {value}")))
}

fn parse_discount(request: &DiscountRequest) -> Result<DiscountSpec, AppError> {
    let kind = DiscountKind::parse(&request.kind)
        .ok_or_else(|| AppError::Validation(format!("Invalid discount type: {}", request.kind)))?;
    let value = parse_decimal(&request.value, "discount value")?;
    Ok(DiscountSpec { kind, value })
}

fn parse_line_items(requests: &[LineItemRequest]) -> Result<Vec<LineItemInput>, AppError> {
    requests
        .iter()
        .map(|item| {
            Ok(LineItemInput {
                description: item.description.clone(),
                quantity: parse_decimal(&item.quantity, "quantity")?,
                rate: parse_decimal(&item.rate, "rate")?,
            })
        })
        .collect()
}

fn parse_payment_status(value: &str) -> Result<PaymentStatus, AppError> {
    PaymentStatus::parse(value)
        .ok_or_else(|| AppError::Validation(format!("Invalid payment status: {value}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/invoices` - List invoices, filterable by projected status and client.
async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(s) => match InvoiceStatus::parse(s) {
            Some(parsed) => Some(parsed),
            None => {
                return app_error(&AppError::Validation(format!("Invalid status: {s}")));
            }
        },
        None => None,
    };
    let client_id = query.client_id.map(ClientId::from_uuid);

    let today = Utc::now().date_naive();
    let invoices = state.invoices.list(client_id, status, today);
    let mut items = Vec::with_capacity(invoices.len());
    for invoice in &invoices {
        match invoice_response(invoice, today) {
            Ok(body) => items.push(body),
            Err(e) => return app_error(&e),
        }
    }

    (StatusCode::OK, Json(json!({ "invoices": items }))).into_response()
}

/// POST `/invoices` - Create a new draft invoice.
async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let defaults = &state.invoicing;

    let currency_code = payload
        .currency
        .unwrap_or_else(|| defaults.default_currency.clone());
    let currency = match Currency::from_str(&currency_code) {
        Ok(c) => c,
        Err(e) => return app_error(&AppError::Validation(e)),
    };

    let tax_rate = match &payload.tax_rate {
        Some(value) => match parse_decimal(value, "tax_rate") {
            Ok(rate) => rate,
            Err(e) => return app_error(&e),
        },
        None => defaults.default_tax_rate,
    };

    let discount = match &payload.discount {
        Some(request) => match parse_discount(request) {
            Ok(d) => d,
            Err(e) => return app_error(&e),
        },
        None => DiscountSpec::none(),
    };

    let line_items = match parse_line_items(&payload.line_items) {
        Ok(items) => items,
        Err(e) => return app_error(&e),
    };

    let today = Utc::now().date_naive();
    let invoice_date = payload.invoice_date.unwrap_or(today);
    let due_date = payload
        .due_date
        .unwrap_or_else(|| invoice_date + Duration::days(i64::from(defaults.default_due_days)));

    let input = CreateInvoiceInput {
        client_id: ClientId::from_uuid(payload.client_id),
        number: payload.number,
        currency,
        invoice_date,
        due_date,
        tax_rate,
        discount,
        line_items,
        notes: payload.notes,
        terms: payload.terms,
    };

    match Invoice::create(input) {
        Ok(invoice) => {
            info!(invoice_id = %invoice.id, number = %invoice.number, "Invoice created");
            let response = invoice_ok(&invoice, StatusCode::CREATED);
            state.invoices.insert(invoice);
            response
        }
        Err(e) => domain_error(&e),
    }
}

/// GET `/invoices/{invoice_id}` - Fetch an invoice snapshot.
async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.invoices.get(InvoiceId::from_uuid(invoice_id)) {
        Ok(invoice) => invoice_ok(&invoice, StatusCode::OK),
        Err(e) => domain_error(&e),
    }
}

/// PATCH `/invoices/{invoice_id}` - Edit invoice inputs.
async fn update_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> impl IntoResponse {
    // Parse everything up front so the mutation closure is validation-free
    let tax_rate = match &payload.tax_rate {
        Some(value) => match parse_decimal(value, "tax_rate") {
            Ok(rate) => Some(rate),
            Err(e) => return app_error(&e),
        },
        None => None,
    };
    let discount = match &payload.discount {
        Some(request) => match parse_discount(request) {
            Ok(d) => Some(d),
            Err(e) => return app_error(&e),
        },
        None => None,
    };
    let line_items = match &payload.line_items {
        Some(requests) => match parse_line_items(requests) {
            Ok(items) => Some(items),
            Err(e) => return app_error(&e),
        },
        None => None,
    };

    let result = state.invoices.mutate(
        InvoiceId::from_uuid(invoice_id),
        payload.expected_version,
        |invoice| {
            if let Some(items) = &line_items {
                invoice.replace_line_items(items)?;
            }
            if let Some(rate) = tax_rate {
                invoice.set_tax_rate(rate)?;
            }
            if let Some(d) = discount {
                invoice.set_discount(d)?;
            }
            if let Some(date) = payload.invoice_date {
                invoice.set_invoice_date(date)?;
            }
            if let Some(date) = payload.due_date {
                invoice.set_due_date(date)?;
            }
            if let Some(notes) = payload.notes.clone() {
                invoice.set_notes(Some(notes))?;
            }
            if let Some(terms) = payload.terms.clone() {
                invoice.set_terms(Some(terms))?;
            }
            Ok(invoice.clone())
        },
    );

    match result {
        Ok(invoice) => invoice_ok(&invoice, StatusCode::OK),
        Err(e) => domain_error(&e),
    }
}

/// DELETE `/invoices/{invoice_id}` - Delete an invoice without payments.
async fn delete_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.invoices.remove(InvoiceId::from_uuid(invoice_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => domain_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/send` - Send the invoice to its client.
async fn send_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Query(query): Query<VersionQuery>,
) -> impl IntoResponse {
    let id = InvoiceId::from_uuid(invoice_id);
    let invoice = match state.invoices.get(id) {
        Ok(invoice) => invoice,
        Err(e) => return domain_error(&e),
    };
    let Some(client) = state.clients.get(invoice.client_id) else {
        return app_error(&AppError::NotFound(format!(
            "Client {} for invoice {invoice_id}",
            invoice.client_id
        )));
    };
    let recipient = client.email.unwrap_or_default();

    let result = state
        .invoices
        .mutate(id, query.expected_version, |invoice| {
            invoice.send(&recipient)?;
            Ok(invoice.clone())
        });

    match result {
        Ok(invoice) => {
            info!(invoice_id = %invoice.id, recipient = %recipient, "Invoice sent");
            invoice_ok(&invoice, StatusCode::OK)
        }
        Err(e) => domain_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/view` - Record a recipient view.
async fn record_view(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Query(query): Query<VersionQuery>,
) -> impl IntoResponse {
    let result = state.invoices.mutate(
        InvoiceId::from_uuid(invoice_id),
        query.expected_version,
        |invoice| {
            invoice.record_view()?;
            Ok(invoice.clone())
        },
    );

    match result {
        Ok(invoice) => invoice_ok(&invoice, StatusCode::OK),
        Err(e) => domain_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/cancel` - Cancel the invoice.
async fn cancel_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Query(query): Query<VersionQuery>,
) -> impl IntoResponse {
    let result = state.invoices.mutate(
        InvoiceId::from_uuid(invoice_id),
        query.expected_version,
        |invoice| {
            invoice.cancel()?;
            Ok(invoice.clone())
        },
    );

    match result {
        Ok(invoice) => {
            info!(invoice_id = %invoice.id, "Invoice cancelled");
            invoice_ok(&invoice, StatusCode::OK)
        }
        Err(e) => domain_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/duplicate` - Copy an invoice into a fresh draft.
async fn duplicate_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    payload: Option<Json<DuplicateInvoiceRequest>>,
) -> impl IntoResponse {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let original = match state.invoices.get(InvoiceId::from_uuid(invoice_id)) {
        Ok(invoice) => invoice,
        Err(e) => return domain_error(&e),
    };

    let today = Utc::now().date_naive();
    let invoice_date = payload.invoice_date.unwrap_or(today);
    let due_date = payload.due_date.unwrap_or_else(|| {
        invoice_date + Duration::days(i64::from(state.invoicing.default_due_days))
    });

    match original.duplicate(payload.number, invoice_date, due_date) {
        Ok(copy) => {
            info!(source = %original.id, copy = %copy.id, "Invoice duplicated");
            let response = invoice_ok(&copy, StatusCode::CREATED);
            state.invoices.insert(copy);
            response
        }
        Err(e) => domain_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/payments` - Record a payment.
async fn record_payment(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    let id = InvoiceId::from_uuid(invoice_id);
    let currency = match state.invoices.get(id) {
        Ok(invoice) => invoice.currency,
        Err(e) => return domain_error(&e),
    };

    let amount = match parse_decimal(&payload.amount, "amount") {
        Ok(value) => match Money::from_decimal(value, currency) {
            Ok(money) => money,
            Err(e) => return app_error(&AppError::Validation(e.to_string())),
        },
        Err(e) => return app_error(&e),
    };
    let Some(method) = PaymentMethod::parse(&payload.method) else {
        return app_error(&AppError::Validation(format!(
            "Invalid payment method: {}",
            payload.method
        )));
    };
    let status = match payload.status.as_deref() {
        Some(value) => match parse_payment_status(value) {
            Ok(status) => status,
            Err(e) => return app_error(&e),
        },
        None => PaymentStatus::Completed,
    };
    let tolerance = match Money::from_decimal(state.invoicing.overpayment_tolerance, currency) {
        Ok(money) => money,
        Err(e) => return app_error(&AppError::Internal(e.to_string())),
    };

    let result = state
        .invoices
        .mutate(id, payload.expected_version, |invoice| {
            let payment_id = invoice.record_payment(
                amount,
                method,
                status,
                payload.external_reference.clone(),
                tolerance,
            )?;
            Ok((payment_id, invoice.clone()))
        });

    match result {
        Ok((payment_id, invoice)) => {
            info!(
                invoice_id = %invoice.id,
                payment_id = %payment_id,
                amount = %amount,
                status = %status,
                "Payment recorded"
            );
            let today = Utc::now().date_naive();
            match invoice_response(&invoice, today) {
                Ok(body) => (
                    StatusCode::CREATED,
                    Json(json!({
                        "payment_id": payment_id.into_inner(),
                        "invoice": body
                    })),
                )
                    .into_response(),
                Err(e) => app_error(&e),
            }
        }
        Err(e) => domain_error(&e),
    }
}

/// PATCH `/invoices/{invoice_id}/payments/{payment_id}` - Transition a payment.
async fn update_payment(
    State(state): State<AppState>,
    Path((invoice_id, payment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> impl IntoResponse {
    let id = InvoiceId::from_uuid(invoice_id);
    let currency = match state.invoices.get(id) {
        Ok(invoice) => invoice.currency,
        Err(e) => return domain_error(&e),
    };

    let status = match parse_payment_status(&payload.status) {
        Ok(status) => status,
        Err(e) => return app_error(&e),
    };
    let tolerance = match Money::from_decimal(state.invoicing.overpayment_tolerance, currency) {
        Ok(money) => money,
        Err(e) => return app_error(&AppError::Internal(e.to_string())),
    };

    let result = state
        .invoices
        .mutate(id, payload.expected_version, |invoice| {
            invoice.update_payment_status(PaymentId::from_uuid(payment_id), status, tolerance)?;
            Ok(invoice.clone())
        });

    match result {
        Ok(invoice) => {
            info!(invoice_id = %invoice.id, payment_id = %payment_id, status = %status, "Payment updated");
            invoice_ok(&invoice, StatusCode::OK)
        }
        Err(e) => domain_error(&e),
    }
}
