//! Authentication endpoint tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestApp;

#[tokio::test]
async fn refresh_without_token_is_bad_request() {
    let app = TestApp::new();

    let response = app.server.post("/api/refresh-token").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_with_garbage_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/refresh-token")
        .json(&json!({ "refresh_token": "not-a-jwt" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_code_requires_code() {
    let app = TestApp::new();

    let response = app.server.get("/api/verify-tg-code").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Code is required");
}

#[tokio::test]
async fn malformed_code_is_rejected_as_invalid() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/api/verify-tg-code")
        .add_query_param("code", "ZZ!")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid or expired code");
}
