//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for clients, invoices, and payments
//! - The in-memory store with per-invoice write serialization
//! - Request/response DTO mapping

pub mod routes;
pub mod store;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use facture_shared::config::InvoicingConfig;
use store::{ClientDirectory, InvoiceStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Invoice store.
    pub invoices: Arc<InvoiceStore>,
    /// Client directory backing the send guard.
    pub clients: Arc<ClientDirectory>,
    /// Invoicing defaults applied at creation time.
    pub invoicing: Arc<InvoicingConfig>,
}

impl AppState {
    /// Creates a fresh state with empty stores.
    #[must_use]
    pub fn new(invoicing: InvoicingConfig) -> Self {
        Self {
            invoices: Arc::new(InvoiceStore::new()),
            clients: Arc::new(ClientDirectory::new()),
            invoicing: Arc::new(invoicing),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
