//! Integration tests for the REST client against an in-process backend.
//!
//! The router below mimics the backend's envelopes closely enough to check
//! paths, the bearer header and status mapping end to end.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use estate_client::{
    ClientConfig, ClientError, DirectoryApi, InventoryApi, LedgerApi, PaymentLedger, RestClient,
    Session,
};
use estate_core::{
    CustomerRef, FlatKey, KycFilter, KycSubmission, Money, PaymentMode, PaymentSummary, Role,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TOKEN: &str = "secret-token";

#[derive(Default)]
struct Recorded {
    bodies: Vec<Value>,
    request_ids: Vec<String>,
    queries: Vec<(String, String)>,
}

type AppState = Arc<Mutex<Recorded>>;

fn authorized(headers: &HeaderMap, state: &AppState) -> Result<(), Response> {
    let expected = format!("Bearer {}", TOKEN);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != expected {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid token" })),
        )
            .into_response());
    }
    if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        state.lock().unwrap().request_ids.push(id.to_string());
    }
    Ok(())
}

async fn book(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((_project, _flat)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorized(&headers, &state) {
        return denied;
    }
    state.lock().unwrap().bodies.push(body);
    Json(json!({ "success": true, "message": "Flat booked successfully" })).into_response()
}

async fn booked(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project, flat)): Path<(String, String)>,
) -> Response {
    if let Err(denied) = authorized(&headers, &state) {
        return denied;
    }
    Json(json!({
        "success": true,
        "booked": {
            "projectId": project,
            "flatId": flat,
            "customer_id": "c1",
            "customer_name": "Asha Rao",
            "totalPayment": 200000,
            "paid": 50000
        }
    }))
    .into_response()
}

async fn pay(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((_project, _flat)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorized(&headers, &state) {
        return denied;
    }
    state.lock().unwrap().bodies.push(body);
    Json(json!({ "success": true, "message": "Payment added", "paid": 100000.5 })).into_response()
}

async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((project, flat)): Path<(String, String)>,
) -> Response {
    if let Err(denied) = authorized(&headers, &state) {
        return denied;
    }
    Json(json!({
        "success": true,
        "count": 2,
        "payments": [
            {
                "projectName": "Skyline Residency",
                "projectId": project,
                "paymentId": "pay-2",
                "flatId": flat,
                "customer": { "id": "c1", "name": "Asha Rao" },
                "amount": 50000,
                "summary": { "mode": "Cheque", "chequeNumber": null, "bankName": null },
                "createdAt": "2024-03-02T10:00:00Z"
            },
            {
                "projectName": "Skyline Residency",
                "projectId": project,
                "paymentId": "pay-1",
                "flatId": flat,
                "customer": { "id": "c1" },
                "amount": 50000,
                "summary": { "mode": "UPI", "chequeNumber": null, "bankName": null },
                "createdAt": "2024-03-01T10:00:00Z"
            }
        ]
    }))
    .into_response()
}

async fn search_payments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    if let Err(denied) = authorized(&headers, &state) {
        return denied;
    }
    state.lock().unwrap().queries.extend(params);
    Json(json!({
        "success": true,
        "payments": [],
        "totalCount": 0,
        "totalPages": 0,
        "currentPage": 2
    }))
    .into_response()
}

async fn submit_kyc(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorized(&headers, &state) {
        return denied;
    }
    (
        StatusCode::CONFLICT,
        Json(json!({ "success": false, "message": "Duplicate exists" })),
    )
        .into_response()
}

async fn approved_customers(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorized(&headers, &state) {
        return denied;
    }
    Json(json!({
        "success": true,
        "count": 1,
        "customers": [
            { "_id": "c1", "name": "Asha Rao", "phone": "9876543210", "status": "approved" }
        ]
    }))
    .into_response()
}

async fn projects(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorized(&headers, &state) {
        return denied;
    }
    Json(json!({ "success": false, "message": "Projects are being re-indexed" })).into_response()
}

async fn approve_loan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((_project, _flat)): Path<(String, String)>,
) -> Response {
    if let Err(denied) = authorized(&headers, &state) {
        return denied;
    }
    Json(json!({ "success": true, "message": "Loan approved" })).into_response()
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/bookings/flats/{project}/{flat}/book", post(book))
        .route("/api/bookings/flats/{project}/{flat}/booked", get(booked))
        .route("/api/payments/flats/{project}/{flat}/pay", post(pay))
        .route("/api/payments/{project}/{flat}/history", get(history))
        .route("/api/payments/search", get(search_payments))
        .route("/api/projects/{project}/flats/{flat}/approve-loan", put(approve_loan))
        .route("/api/projects", get(projects))
        .route("/api/customer-kyc/approved", get(approved_customers))
        .route("/api/customer-kyc/kyc", post(submit_kyc))
        .with_state(state)
}

/// Backend bound to an ephemeral port.
struct TestServer {
    base_url: String,
    state: AppState,
}

impl TestServer {
    async fn new() -> Self {
        let state = AppState::default();
        let app = create_router(Arc::clone(&state));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base_url: format!("http://{}/api/", addr),
            state,
        }
    }

    fn client(&self, token: &str) -> RestClient {
        let session = Session::new("u1", "ops@estate.in", Role::Admin, token);
        RestClient::new(&ClientConfig::with_base_url(self.base_url.clone()), session).unwrap()
    }
}

fn key() -> FlatKey {
    FlatKey::new("proj-1", "A-101")
}

#[tokio::test]
async fn book_sends_bearer_and_camel_case_body() {
    let server = TestServer::new().await;
    let client = server.client(TOKEN);

    let request = estate_client::wire::BookFlatRequest {
        customer: CustomerRef {
            id: "c1".to_string(),
            name: Some("Asha Rao".to_string()),
            phone: None,
        },
        amount: Money::from_rupees(50_000),
        total_payment: Money::from_rupees(200_000),
        summary: PaymentSummary::cheque(Some("004512"), None),
    };
    client.book_flat(&key(), &request).await.unwrap();

    let recorded = server.state.lock().unwrap();
    let body = &recorded.bodies[0];
    assert_eq!(body["totalPayment"], json!(200000));
    assert_eq!(body["amount"], json!(50000));
    assert_eq!(body["customer"]["id"], "c1");
    assert_eq!(body["summary"]["mode"], "Cheque");
    assert_eq!(body["summary"]["chequeNumber"], "004512");
    assert_eq!(body["summary"]["bankName"], Value::Null);
    assert_eq!(recorded.request_ids.len(), 1);
}

#[tokio::test]
async fn booking_and_payment_envelopes_decode() {
    let server = TestServer::new().await;
    let client = server.client(TOKEN);

    let booking = client.booked_flat(&key()).await.unwrap();
    assert_eq!(booking.flat_id, "A-101");
    assert_eq!(booking.total_payment, Money::from_rupees(200_000));
    assert_eq!(booking.paid, Money::from_rupees(50_000));
    assert!(!booking.loan_approved);

    let request = estate_client::wire::AddPaymentRequest {
        amount: Money::from_rupees(50_000) + Money::from_paise(50),
        summary: PaymentSummary::new(PaymentMode::Upi),
    };
    let paid = client.add_payment(&key(), &request).await.unwrap();
    assert_eq!(paid, Money::from_rupees(100_000) + Money::from_paise(50));

    let body = server.state.lock().unwrap().bodies[0].clone();
    assert_eq!(body["amount"], json!(50000.5));
    assert_eq!(body["summary"]["mode"], "UPI");
}

#[tokio::test]
async fn ledger_orders_history_oldest_first() {
    let server = TestServer::new().await;
    let ledger = PaymentLedger::new(Arc::new(server.client(TOKEN)));

    let history = ledger.history(&key()).await.unwrap();
    let ids: Vec<_> = history.iter().map(|p| p.payment_id.as_str()).collect();
    assert_eq!(ids, vec!["pay-1", "pay-2"]);
    assert_eq!(history[1].summary.describe(), "Cheque #- (bank -)");
}

#[tokio::test]
async fn payment_search_sends_query_and_page() {
    let server = TestServer::new().await;
    let client = server.client(TOKEN);

    let page = client.search_payments("Asha", 2).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.current_page, 2);
    assert!(!page.has_next());

    let queries = server.state.lock().unwrap().queries.clone();
    assert_eq!(
        queries,
        vec![
            ("q".to_string(), "Asha".to_string()),
            ("page".to_string(), "2".to_string()),
        ]
    );
}

#[tokio::test]
async fn approve_loan_uses_put() {
    let server = TestServer::new().await;
    server.client(TOKEN).approve_loan(&key()).await.unwrap();
}

#[tokio::test]
async fn approved_customer_listing_decodes() {
    let server = TestServer::new().await;
    let client = server.client(TOKEN);

    let page = client.list_customers(KycFilter::Approved, 1).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert!(page.items[0].is_approved());
}

#[tokio::test]
async fn wrong_token_maps_to_unauthorized() {
    let server = TestServer::new().await;
    let client = server.client("stale-token");

    let err = client.booked_flat(&key()).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Invalid token"));
}

#[tokio::test]
async fn duplicate_kyc_maps_to_conflict() {
    let server = TestServer::new().await;
    let client = server.client(TOKEN);

    let submission = KycSubmission {
        customer_id: "c9".to_string(),
        name: "Ravi Kumar".to_string(),
        normalized_name: "ravikumar".to_string(),
        phone: "9876543210".to_string(),
        address: "4 Park Street".to_string(),
        aadhaar: "123456789012".to_string(),
        pan: "ABCDE1234F".to_string(),
        voter: None,
        other: None,
        aadhaar_key: "kyc/c9/aadhaar.jpg".to_string(),
        pan_key: "kyc/c9/pan.jpg".to_string(),
        voter_key: String::new(),
        other_key: String::new(),
    };
    let err = client.submit_kyc(&submission).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn unsuccessful_envelope_is_rejected() {
    let server = TestServer::new().await;
    let client = server.client(TOKEN);

    let err = client.projects().await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(ref m) if m == "Projects are being re-indexed"));
}

#[tokio::test]
async fn unknown_route_maps_to_not_found() {
    let server = TestServer::new().await;
    let client = server.client(TOKEN);

    let err = client.project_flats("proj-1").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn signed_out_client_sends_nothing() {
    let server = TestServer::new().await;
    let client = server.client("");

    let err = client.booked_flat(&key()).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingSession));
    assert!(server.state.lock().unwrap().request_ids.is_empty());
}
