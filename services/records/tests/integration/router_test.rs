use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;

use medgate_core::clock::SystemClock;
use medgate_records::infra::storage::LocalStorage;
use medgate_records::router::build_router;
use medgate_records::state::AppState;
use medgate_testing::auth::MockSession;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// A server over a disconnected database, so any repository call fails.
async fn offline_server() -> TestServer {
    let dir = std::env::temp_dir().join(format!("medgate-router-{}", uuid::Uuid::new_v4()));
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        storage: LocalStorage::new(dir).await.unwrap(),
        clock: SystemClock,
        max_upload_bytes: 1024,
    };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_answer_health_probes() {
    let server = offline_server().await;

    let health = server.get("/healthz").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    assert_eq!(health.json::<serde_json::Value>()["status"], "ok");

    let ready = server.get("/readyz").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn should_reject_protected_routes_without_bearer() {
    let server = offline_server().await;

    for (method, path) in [
        (Method::GET, "/api/me"),
        (Method::GET, "/api/patient/access-logs"),
        (Method::POST, "/api/doctor/access/code"),
        (Method::POST, "/api/pharmacist/prescriptions/RX-1/dispense"),
        (Method::GET, "/api/files/reports/1"),
    ] {
        let response = server
            .method(method.clone(), path)
            .json(&serde_json::json!({}))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED, "{method} {path}");
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["kind"], "MISSING_TOKEN", "{method} {path}");
        assert_eq!(json["message"], "missing bearer token");
    }
}

#[tokio::test]
async fn should_treat_non_bearer_authorization_as_missing() {
    let server = offline_server().await;

    let response = server
        .get("/api/me")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<serde_json::Value>()["kind"], "MISSING_TOKEN");
}

#[tokio::test]
async fn should_hide_storage_failures_behind_internal_error() {
    let server = offline_server().await;
    let headers = MockSession::unissued().headers();
    let bearer = headers.get(AUTHORIZATION).unwrap().clone();

    let response = server.get("/api/me").add_header(AUTHORIZATION, bearer).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["kind"], "INTERNAL");
    assert_eq!(json["message"], "internal error");
}

#[tokio::test]
async fn should_echo_request_id() {
    let server = offline_server().await;

    let response = server
        .get("/healthz")
        .add_header(REQUEST_ID, HeaderValue::from_static("req-42"))
        .await;

    assert_eq!(response.headers().get(REQUEST_ID).unwrap(), "req-42");
}

#[tokio::test]
async fn should_stamp_request_id_when_absent() {
    let server = offline_server().await;

    let response = server.get("/healthz").await;

    assert!(response.headers().contains_key(REQUEST_ID));
}
