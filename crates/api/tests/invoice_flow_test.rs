//! End-to-end invoice flow tests through the HTTP router.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use facture_api::{AppState, create_router};
use facture_shared::config::InvoicingConfig;

fn app() -> Router {
    create_router(AppState::new(InvoicingConfig::default()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_client(app: &Router, email: Option<&str>) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/clients",
        Some(json!({ "name": "Acme Corp", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_works() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn invoice_lifecycle_happy_path() {
    let app = app();
    let client_id = create_client(&app, Some("ap@acme.example")).await;

    // Create: 2 x 50.00 + 1 x 25.50, 10% tax, 10.00 fixed discount
    let (status, invoice) = send(
        &app,
        "POST",
        "/api/v1/invoices",
        Some(json!({
            "client_id": client_id,
            "tax_rate": "10",
            "discount": { "type": "FIXED", "value": "10" },
            "line_items": [
                { "description": "Design work", "quantity": "2", "rate": "50.00" },
                { "description": "Stock photo", "quantity": "1", "rate": "25.50" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invoice["status"], "DRAFT");
    assert_eq!(invoice["subtotal"], "125.50");
    assert_eq!(invoice["tax_amount"], "12.55");
    assert_eq!(invoice["discount_amount"], "10.00");
    assert_eq!(invoice["total_amount"], "128.05");
    assert_eq!(invoice["balance_due"], "128.05");
    let invoice_id = invoice["id"].as_str().unwrap().to_string();

    // Send
    let (status, invoice) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/send"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["status"], "SENT");

    // Partial payment
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/payments"),
        Some(json!({ "amount": "40.00", "method": "card" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice"]["status"], "PARTIALLY_PAID");
    assert_eq!(body["invoice"]["balance_due"], "88.05");

    // Deleting a paid-against invoice is refused
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/invoices/{invoice_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "HAS_COMPLETED_PAYMENTS");

    // Pay off the balance
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/payments"),
        Some(json!({ "amount": "88.05", "method": "bank_transfer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice"]["status"], "PAID");
    assert_eq!(body["invoice"]["balance_due"], "0.00");

    // Any further payment is an overpayment
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/payments"),
        Some(json!({ "amount": "0.01", "method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "OVERPAYMENT");
}

#[tokio::test]
async fn send_guards_are_reported() {
    let app = app();
    let client_id = create_client(&app, Some("ap@acme.example")).await;

    // An empty draft cannot be sent
    let (status, invoice) = send(
        &app,
        "POST",
        "/api/v1/invoices",
        Some(json!({ "client_id": client_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let invoice_id = invoice["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/send"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NO_LINE_ITEMS");

    // A client without an email cannot be sent to
    let bare_client = create_client(&app, None).await;
    let (_, invoice) = send(
        &app,
        "POST",
        "/api/v1/invoices",
        Some(json!({
            "client_id": bare_client,
            "line_items": [
                { "description": "Work", "quantity": "1", "rate": "100.00" }
            ]
        })),
    )
    .await;
    let invoice_id = invoice["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/send"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "MISSING_RECIPIENT");
}

#[tokio::test]
async fn stale_version_is_a_conflict() {
    let app = app();
    let client_id = create_client(&app, Some("ap@acme.example")).await;

    let (_, invoice) = send(
        &app,
        "POST",
        "/api/v1/invoices",
        Some(json!({
            "client_id": client_id,
            "line_items": [
                { "description": "Work", "quantity": "1", "rate": "100.00" }
            ]
        })),
    )
    .await;
    let invoice_id = invoice["id"].as_str().unwrap().to_string();
    assert_eq!(invoice["version"], 1);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/invoices/{invoice_id}"),
        Some(json!({ "expected_version": 7, "tax_rate": "5" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "VERSION_MISMATCH");

    // With the right token the edit lands
    let (status, invoice) = send(
        &app,
        "PATCH",
        &format!("/api/v1/invoices/{invoice_id}"),
        Some(json!({ "expected_version": 1, "tax_rate": "5" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["tax_amount"], "5.00");
    assert_eq!(invoice["version"], 2);
}

#[tokio::test]
async fn editing_a_viewed_invoice_is_refused() {
    let app = app();
    let client_id = create_client(&app, Some("ap@acme.example")).await;

    let (_, invoice) = send(
        &app,
        "POST",
        "/api/v1/invoices",
        Some(json!({
            "client_id": client_id,
            "line_items": [
                { "description": "Work", "quantity": "1", "rate": "100.00" }
            ]
        })),
    )
    .await;
    let invoice_id = invoice["id"].as_str().unwrap().to_string();

    send(&app, "POST", &format!("/api/v1/invoices/{invoice_id}/send"), None).await;
    let (status, invoice) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/view"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["status"], "VIEWED");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/invoices/{invoice_id}"),
        Some(json!({ "tax_rate": "5" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NOT_EDITABLE");

    // The escape hatch is duplication
    let (status, copy) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/duplicate"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["status"], "DRAFT");
    assert_eq!(copy["subtotal"], "100.00");
    assert_eq!(copy["payments"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn cancel_guard_and_refund_flow() {
    let app = app();
    let client_id = create_client(&app, Some("ap@acme.example")).await;

    let (_, invoice) = send(
        &app,
        "POST",
        "/api/v1/invoices",
        Some(json!({
            "client_id": client_id,
            "line_items": [
                { "description": "Work", "quantity": "1", "rate": "100.00" }
            ]
        })),
    )
    .await;
    let invoice_id = invoice["id"].as_str().unwrap().to_string();
    send(&app, "POST", &format!("/api/v1/invoices/{invoice_id}/send"), None).await;

    let (_, body) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/payments"),
        Some(json!({ "amount": "100.00", "method": "card" })),
    )
    .await;
    let payment_id = body["payment_id"].as_str().unwrap().to_string();
    assert_eq!(body["invoice"]["status"], "PAID");

    // Refund regresses the status, then cancellation is possible
    let (status, invoice) = send(
        &app,
        "PATCH",
        &format!("/api/v1/invoices/{invoice_id}/payments/{payment_id}"),
        Some(json!({ "status": "REFUNDED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["status"], "SENT");
    assert_eq!(invoice["paid_amount"], "0.00");

    let (status, invoice) = send(
        &app,
        "POST",
        &format!("/api/v1/invoices/{invoice_id}/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["status"], "CANCELLED");
}
