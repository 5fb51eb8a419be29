//! API integration tests.
//!
//! Routers are driven with `tower::ServiceExt::oneshot` over a mock database.
//! Each mock queues results in the exact order the request will query them.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
};
use chrono::Utc;
use http_body_util::BodyExt;
use portal_api::{AppState, auth_middleware, router as api_router};
use portal_common::ReferenceId;
use portal_db::entities::{
    fault_category,
    fault_report::{self, FaultStatus},
    fault_status_history,
    member::{self, MemberStatus},
    user::{self, UserRole},
};
use portal_db::test_utils::TestDatabase;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "0123456789abcdef0123456789abcdef";

fn test_user(role: UserRole) -> user::Model {
    user::Model {
        id: "staff1".to_string(),
        email: "staff@example.edu".to_string(),
        name: "Works Staff".to_string(),
        password_hash: "$argon2id$stub".to_string(),
        role,
        token: Some(TOKEN.to_string()),
        is_active: true,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn test_category() -> fault_category::Model {
    fault_category::Model {
        id: "plumbing".to_string(),
        name: "Plumbing".to_string(),
        description: None,
        is_active: true,
        display_order: 2,
        created_at: Utc::now(),
    }
}

fn test_fault(status: FaultStatus) -> fault_report::Model {
    fault_report::Model {
        id: "fault1".to_string(),
        reference_id: "FRMS-2026-Q7P2ZK".to_string(),
        reporter_name: "Ada Obi".to_string(),
        reporter_email: "ada@example.edu".to_string(),
        reporter_phone: None,
        location: "Hall B, Room 12".to_string(),
        category_id: "plumbing".to_string(),
        description: "Tap in the kitchen will not close".to_string(),
        attachment_url: None,
        status,
        assigned_to: None,
        admin_notes: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn test_entry(id: i64, status: FaultStatus, note: &str) -> fault_status_history::Model {
    fault_status_history::Model {
        id,
        fault_id: "fault1".to_string(),
        status,
        note: Some(note.to_string()),
        changed_by: None,
        created_at: Utc::now(),
    }
}

fn test_member() -> member::Model {
    member::Model {
        id: "member1".to_string(),
        matric_number: "CSC/2021/001".to_string(),
        email: "chidi@example.edu".to_string(),
        first_name: "Chidi".to_string(),
        last_name: "Okafor".to_string(),
        phone: "+2348000000000".to_string(),
        department: "Computer Science".to_string(),
        level: "300".to_string(),
        status: MemberStatus::Pending,
        created_at: Utc::now(),
        updated_at: None,
    }
}

const REGISTRATION: &str = r#"{
    "matricNumber": "csc/2021/001",
    "email": "Chidi@Example.edu",
    "firstName": "Chidi",
    "lastName": "Okafor",
    "phone": "+2348000000000",
    "department": "Computer Science",
    "level": "300"
}"#;

/// Create the test router over a prepared mock database.
fn create_test_router(db: DatabaseConnection) -> Router {
    router_over(Arc::new(db))
}

fn router_over(db: Arc<DatabaseConnection>) -> Router {
    let state = AppState::new(db);

    Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).method("GET").body(Body::empty()).unwrap()
}

fn authed(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .uri(uri)
        .method(method)
        .header("Authorization", format!("Bearer {TOKEN}"));

    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = create_test_router(empty_db())
        .oneshot(get("/api/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let response = create_test_router(empty_db())
        .oneshot(get("/api/nonexistent/endpoint"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_track_malformed_reference_is_not_found() {
    // The mock has nothing queued, so any query would surface as a 500
    let response = create_test_router(empty_db())
        .oneshot(get("/api/faults/track/frms-2026-abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "FAULT_NOT_FOUND");
}

#[tokio::test]
async fn test_track_returns_public_timeline() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_fault(FaultStatus::InProgress)]])
        .append_query_results([[test_category()]])
        .append_query_results([[
            test_entry(1, FaultStatus::Open, "Fault report submitted"),
            test_entry(2, FaultStatus::InProgress, "Plumber on the way"),
        ]])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(get("/api/faults/track/FRMS-2026-Q7P2ZK"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["referenceId"], "FRMS-2026-Q7P2ZK");
    assert_eq!(body["data"]["statusLabel"], "In Progress");
    assert_eq!(body["data"]["category"], "Plumbing");
    assert_eq!(body["data"]["timeline"].as_array().map(Vec::len), Some(2));
    assert!(body["data"].get("reporterEmail").is_none());
}

#[tokio::test]
async fn test_submit_fault_returns_reference_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_category()]])
        .append_query_results([[test_fault(FaultStatus::Open)]])
        .append_query_results([[test_entry(1, FaultStatus::Open, "Fault report submitted")]])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(
            Request::builder()
                .uri("/api/faults")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{
                        "reporterName": "Ada Obi",
                        "reporterEmail": "ada@example.edu",
                        "location": "Hall B, Room 12",
                        "categoryId": "plumbing",
                        "description": "Tap in the kitchen will not close"
                    }"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let reference = body["data"]["referenceId"].as_str().unwrap();
    assert!(ReferenceId::is_valid(reference));
    assert_eq!(body["data"]["status"], "OPEN");
}

#[tokio::test]
async fn test_submit_fault_with_invalid_json_returns_error() {
    let response = create_test_router(empty_db())
        .oneshot(
            Request::builder()
                .uri("/api/faults")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_staff_endpoints_require_token() {
    for uri in ["/api/faults", "/api/faults/stats", "/api/faults/fault1/history"] {
        let response = create_test_router(empty_db()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_change_status_rejects_unknown_status() {
    // Only the token lookup is queued; a write attempt would fail with a 500
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user(UserRole::Staff)]])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(authed(
            "POST",
            "/api/faults/fault1/status",
            Some(r#"{"status":"REOPENED"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_change_status_on_unknown_fault_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user(UserRole::Staff)]])
        .append_query_results([Vec::<fault_report::Model>::new()])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(authed(
            "POST",
            "/api/faults/missing/status",
            Some(r#"{"status":"RESOLVED","note":"Fixed"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_lists_entries_in_order() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user(UserRole::Staff)]])
        .append_query_results([[test_fault(FaultStatus::Resolved)]])
        .append_query_results([[
            test_entry(1, FaultStatus::Open, "Fault report submitted"),
            test_entry(2, FaultStatus::InProgress, "Status changed to In Progress"),
            test_entry(3, FaultStatus::Resolved, "Washer replaced"),
        ]])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(authed("GET", "/api/faults/fault1/history", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let statuses: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["status"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(statuses, ["OPEN", "IN_PROGRESS", "RESOLVED"]);
}

#[tokio::test]
async fn test_stats_for_staff() {
    let count = |n: i64| {
        [maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }]
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user(UserRole::Staff)]])
        .append_query_results([count(3)])
        .append_query_results([count(1)])
        .append_query_results([count(5)])
        .append_query_results([count(2)])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(authed("GET", "/api/faults/stats", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["inProgress"], 1);
    assert_eq!(body["data"]["total"], 11);
}

#[tokio::test]
async fn test_user_management_requires_admin() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user(UserRole::Staff)]])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(authed("GET", "/api/users", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_me_hides_secrets() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user(UserRole::Admin)]])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(authed("GET", "/api/auth/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["role"], "ADMIN");
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("token").is_none());
}

#[tokio::test]
async fn test_list_categories_is_public() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_category()]])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(get("/api/fault-categories"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"][0]["id"], "plumbing");
    assert_eq!(body["data"][0]["displayOrder"], 2);
}

#[tokio::test]
async fn test_update_fault_changes_status_and_clears_notes() {
    let mut noted = test_fault(FaultStatus::Open);
    noted.admin_notes = Some("Waiting on parts".to_string());

    let mut updated = test_fault(FaultStatus::InProgress);
    updated.updated_at = Some(Utc::now());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user(UserRole::Staff)]])
        .append_query_results([[noted]])
        .append_query_results([[test_entry(
            2,
            FaultStatus::InProgress,
            "Status changed to In Progress",
        )]])
        .append_query_results([[updated]])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(authed(
            "PATCH",
            "/api/faults/fault1",
            Some(r#"{"status":"IN_PROGRESS","adminNotes":null}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "IN_PROGRESS");
    assert_eq!(body["data"]["statusLabel"], "In Progress");
    assert!(body["data"]["adminNotes"].is_null());
}

#[tokio::test]
async fn test_update_fault_requires_token() {
    let response = create_test_router(empty_db())
        .oneshot(
            Request::builder()
                .uri("/api/faults/fault1")
                .method("PATCH")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"status":"RESOLVED"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_member_returns_created() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_member()]])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(post_json("/api/members", REGISTRATION))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["matricNumber"], "CSC/2021/001");
    assert_eq!(body["data"]["status"], "PENDING");
}

#[tokio::test]
async fn test_register_member_rejects_blank_name() {
    let blank = REGISTRATION.replace(r#""firstName": "Chidi""#, r#""firstName": "   ""#);

    let response = create_test_router(empty_db())
        .oneshot(post_json("/api/members", &blank))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_check_duplicate_reports_taken_keys() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_member()]])
        .append_query_results([Vec::<member::Model>::new()])
        .into_connection();

    let response = create_test_router(db)
        .oneshot(post_json(
            "/api/members/check-duplicate",
            r#"{"matricNumber":"csc/2021/001","email":"new@example.edu"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["matricNumberTaken"], true);
    assert_eq!(body["data"]["emailTaken"], false);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_register_member_twice_is_conflict() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    let router = router_over(db.connection());

    let first = router
        .clone()
        .oneshot(post_json("/api/members", REGISTRATION))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router
        .clone()
        .oneshot(post_json("/api/members", REGISTRATION))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = json_body(second).await;
    assert_eq!(body["error"]["code"], "CONFLICT");

    drop(router);
    db.drop_database().await.unwrap();
}
