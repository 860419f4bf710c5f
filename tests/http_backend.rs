//! HttpBackend against a stub backend served by axum on a local port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use franchise_portal::ClientError;
use franchise_portal::form::Attachment;
use franchise_portal::models::{ApplicationUpdate, BankAccountRequest, RecordKey};
use franchise_portal::services::http_backend::REQUEST_ID_HEADER;
use franchise_portal::services::{ApplicationSubmission, FranchiseBackend, HttpBackend};

#[derive(Default)]
struct Seen {
    request_ids: Vec<String>,
    multipart_fields: Vec<String>,
}

type Shared = Arc<Mutex<Seen>>;

fn record_id(headers: &HeaderMap, seen: &Shared) {
    if let Some(id) = headers.get(REQUEST_ID_HEADER).and_then(|h| h.to_str().ok()) {
        seen.lock().unwrap().request_ids.push(id.to_string());
    }
}

async fn applications() -> Json<Value> {
    Json(json!([
        {"_id": "a1", "fullName": "Asha Verma", "email": "asha@example.com", "approved": true, "agreementSent": true},
        {"_id": "a2", "name": "Ravi Kumar", "email": "ravi@example.com", "phoneNumber": "9000012345"}
    ]))
}

async fn agent_applications(Path(agent_id): Path<String>) -> (StatusCode, Json<Value>) {
    if agent_id == "AGT404" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Agent not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": [{"_id": "p1", "name": "Meera Rao", "email": "meera@example.com", "location": "Domlur", "assignedBank": {"_id": "b1", "bankName": "HDFC Bank"}}]
        })),
    )
}

async fn application_by_email(Path(email): Path<String>) -> Json<Value> {
    if email == "missing@example.com" {
        return Json(json!({"success": false, "message": "Application not found"}));
    }
    Json(json!({"success": true, "data": {"_id": "a1", "fullName": "Asha Verma", "email": email, "assignedBank": "qr_code"}}))
}

async fn update_application(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_id(&headers, &seen);
    if body.get("name").and_then(Value::as_str) == Some("") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Name is required"})),
        );
    }
    (StatusCode::OK, Json(json!({"success": true, "data": {"_id": id}})))
}

async fn approve(State(seen): State<Shared>, headers: HeaderMap, Json(key): Json<Value>) -> Json<Value> {
    record_id(&headers, &seen);
    assert_eq!(key["email"], "asha@example.com");
    Json(json!({"message": "Approval mail sent", "customerId": "CUST-1"}))
}

async fn reject() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>Internal Server Error</html>")
}

async fn banks() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {"_id": "b1", "bankName": "HDFC Bank", "accountHolderName": "Valmo Logistics", "accountNumber": "001234567890", "ifscCode": "HDFC0001234"}
    }))
}

async fn create_bank(State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    record_id(&headers, &seen);
    assert_eq!(body["ifscCode"], "HDFC0001234");
    Json(json!({"success": true}))
}

async fn submit(State(seen): State<Shared>, mut multipart: Multipart) -> Json<Value> {
    let mut full_name = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "fullName" {
            full_name = field.text().await.ok();
        }
        seen.lock().unwrap().multipart_fields.push(name);
    }
    match full_name.as_deref() {
        Some("Duplicate") => Json(json!({"success": false, "message": "Application already exists"})),
        // Accepted by the server but without the success flag
        Some("Silent") => Json(json!({"message": "Queued"})),
        _ => Json(json!({"success": true, "message": "Application submitted", "data": {"_id": "a9"}})),
    }
}

async fn credentials(Query(query): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    match query.get("email").map(String::as_str) {
        Some("asha@example.com") => (
            StatusCode::OK,
            Json(json!({"success": true, "data": {"customerId": "CUST-1", "password": "s3cret"}})),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "Customer not found"}))),
    }
}

async fn agent_login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] != "agent-pass" || body["userType"] != "agent" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        );
    }
    let ids = match body["email"].as_str() {
        Some("numeric@example.com") => json!({"userId": 42, "agentId": 7}),
        Some("broken@example.com") => json!({"userId": "u-18", "agentId": {"code": 7}}),
        _ => json!({"userId": "u-17", "agentId": "AGT001"}),
    };
    (StatusCode::OK, Json(json!({"success": true, "data": ids})))
}

async fn spawn_stub() -> (HttpBackend, Shared) {
    let seen = Shared::default();
    let app = Router::new()
        .route("/applications", get(applications))
        .route("/application/agent/{agent_id}", get(agent_applications))
        .route("/getApplication/email/{email}", get(application_by_email))
        .route("/application/{id}", put(update_application))
        .route("/application/approve", post(approve))
        .route("/application/reject", post(reject))
        .route("/bank-details", get(banks).post(create_bank))
        .route("/createApplication", post(submit))
        .route("/customer/credentials", get(credentials))
        .route("/Agentlogin", post(agent_login))
        .with_state(Arc::clone(&seen));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let backend = HttpBackend::with_client(reqwest::Client::new(), &format!("http://{addr}")).unwrap();
    (backend, seen)
}

#[tokio::test]
async fn lists_bare_and_enveloped_applications() {
    let (backend, _) = spawn_stub().await;

    let all = backend.list_applications().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].status.agreement_sent());
    assert_eq!(all[1].name(), "Ravi Kumar");
    assert_eq!(all[1].phone(), Some("9000012345"));

    let mine = backend.list_agent_applications("AGT001").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].assigned_bank.as_deref(), Some("b1"));
}

#[tokio::test]
async fn error_status_carries_backend_message() {
    let (backend, _) = spawn_stub().await;

    let err = backend.list_agent_applications("AGT404").await.unwrap_err();
    match err {
        ClientError::Backend { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Agent not found");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn unsuccessful_envelope_is_an_error() {
    let (backend, _) = spawn_stub().await;

    let err = backend
        .application_by_email("missing@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Backend { status: 200, .. }));
    assert_eq!(err.to_string(), "Application not found");

    let found = backend.application_by_email("asha@example.com").await.unwrap();
    assert_eq!(found.assigned_bank.as_deref(), Some("qr_code"));
}

#[tokio::test]
async fn html_error_page_falls_back_to_generic_message() {
    let (backend, _) = spawn_stub().await;

    let err = backend
        .reject(&RecordKey::new("asha@example.com", "Asha Verma"))
        .await
        .unwrap_err();
    match err {
        ClientError::Backend { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Request failed");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn approve_returns_customer_id_and_tags_request() {
    let (backend, seen) = spawn_stub().await;

    let ack = backend
        .approve(&RecordKey::new("asha@example.com", "Asha Verma"))
        .await
        .unwrap();
    assert_eq!(ack.customer_id.as_deref(), Some("CUST-1"));
    assert_eq!(ack.message.as_deref(), Some("Approval mail sent"));

    let ids = &seen.lock().unwrap().request_ids;
    assert_eq!(ids.len(), 1);
    assert!(uuid::Uuid::parse_str(&ids[0]).is_ok());
}

#[tokio::test]
async fn mutations_get_distinct_request_ids() {
    let (backend, seen) = spawn_stub().await;

    let update = ApplicationUpdate {
        name: "Asha V".to_string(),
        ..ApplicationUpdate::default()
    };
    backend.update_application("a1", &update).await.unwrap();

    let request = BankAccountRequest {
        account_holder_name: "Valmo Logistics".to_string(),
        account_number: "001234567890".to_string(),
        ifsc_code: "HDFC0001234".to_string(),
        bank_name: "HDFC Bank".to_string(),
        ..BankAccountRequest::default()
    };
    backend.create_bank(&request).await.unwrap();

    let ids = seen.lock().unwrap().request_ids.clone();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn update_rejection_surfaces_message() {
    let (backend, _) = spawn_stub().await;

    let err = backend
        .update_application("a1", &ApplicationUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Name is required");
}

#[tokio::test]
async fn single_bank_object_reads_as_list() {
    let (backend, _) = spawn_stub().await;

    let banks = backend.list_banks().await.unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0].id, "b1");
    assert_eq!(banks[0].branch_name, "");
}

#[tokio::test]
async fn submit_sends_fields_and_files() {
    let (backend, seen) = spawn_stub().await;

    let submission = ApplicationSubmission {
        fields: vec![
            ("fullName".to_string(), "Asha Verma".to_string()),
            ("email".to_string(), "asha@example.com".to_string()),
        ],
        files: vec![(
            "panCard".to_string(),
            Attachment::new("pan.jpg", "image/jpeg", vec![0xff, 0xd8]),
        )],
    };
    let receipt = backend.submit_application(submission).await.unwrap();
    assert_eq!(receipt.application_id.as_deref(), Some("a9"));

    let fields = seen.lock().unwrap().multipart_fields.clone();
    assert_eq!(fields, ["fullName", "email", "panCard"]);
}

#[tokio::test]
async fn submit_requires_explicit_success() {
    let (backend, _) = spawn_stub().await;

    for (name, message) in [("Duplicate", "Application already exists"), ("Silent", "Queued")] {
        let submission = ApplicationSubmission {
            fields: vec![("fullName".to_string(), name.to_string())],
            files: Vec::new(),
        };
        let err = backend.submit_application(submission).await.unwrap_err();
        assert_eq!(err.to_string(), message);
    }
}

#[tokio::test]
async fn customer_credentials_by_query() {
    let (backend, _) = spawn_stub().await;

    let creds = backend.customer_credentials("asha@example.com").await.unwrap();
    assert_eq!(creds.password, "s3cret");
    assert_eq!(creds.customer_id.as_deref(), Some("CUST-1"));

    let err = backend.customer_credentials("nobody@example.com").await.unwrap_err();
    assert!(matches!(err, ClientError::Backend { status: 404, .. }));
}

#[tokio::test]
async fn agent_login_reads_nested_ids() {
    use franchise_portal::models::{AgentLoginRequest, Role};

    let login = |email: &str| AgentLoginRequest {
        email: email.to_string(),
        password: "agent-pass".to_string(),
        user_type: Role::Agent,
    };

    let (backend, _) = spawn_stub().await;
    let response = backend.agent_login(&login("agent@example.com")).await.unwrap();
    assert_eq!(response.agent_id.as_deref(), Some("AGT001"));
    assert_eq!(response.user_id.as_deref(), Some("u-17"));

    let numeric = backend.agent_login(&login("numeric@example.com")).await.unwrap();
    assert_eq!(numeric.agent_id.as_deref(), Some("7"));
    assert_eq!(numeric.user_id.as_deref(), Some("42"));

    let err = backend.agent_login(&login("broken@example.com")).await.unwrap_err();
    assert!(matches!(err, ClientError::Serialization(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let backend = HttpBackend::with_client(reqwest::Client::new(), "http://127.0.0.1:9").unwrap();
    let err = backend.list_applications().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.to_notice().message, "Network error. Please try again.");
}
