//! API route definitions.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;

use crate::AppState;
use facture_core::invoice::InvoiceError;
use facture_shared::AppError;

pub mod clients;
pub mod health;
pub mod invoices;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(clients::routes())
        .merge(invoices::routes())
}

/// Renders a boundary error as a JSON response.
pub(crate) fn app_error(e: &AppError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": e.error_code(), "message": e.to_string() })),
    )
        .into_response()
}

/// Renders a domain error as a JSON response.
pub(crate) fn domain_error(e: &InvoiceError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": e.error_code(), "message": e.to_string() })),
    )
        .into_response()
}
