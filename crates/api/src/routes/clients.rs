//! Client directory routes.
//!
//! The client record is an external collaborator as far as the invoicing
//! core is concerned; these routes exist so the send guard has a directory
//! to resolve recipient addresses from.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::routes::app_error;
use crate::store::Client;
use facture_shared::AppError;
use facture_shared::types::ClientId;

/// Creates the client routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", post(create_client))
        .route("/clients/{client_id}", get(get_client))
}

/// Request body for creating a client.
#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    /// Display name.
    pub name: String,
    /// Recipient email address.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// Response for a client.
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    /// Client ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Recipient email address.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id.into_inner(),
            name: client.name,
            email: client.email,
            address: client.address,
        }
    }
}

/// POST `/clients` - Register a client.
async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClientRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return app_error(&AppError::Validation("Client name cannot be empty".into()));
    }

    let client = Client {
        id: ClientId::new(),
        name: payload.name.trim().to_string(),
        email: payload.email,
        address: payload.address,
    };
    let response = ClientResponse::from(client.clone());
    state.clients.insert(client);

    (StatusCode::CREATED, Json(response)).into_response()
}

/// GET `/clients/{client_id}` - Fetch a client.
async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.clients.get(ClientId::from_uuid(client_id)) {
        Some(client) => (StatusCode::OK, Json(ClientResponse::from(client))).into_response(),
        None => app_error(&AppError::NotFound(format!("Client {client_id}"))),
    }
}
