//! Request validation tests. Every case is rejected before any query runs.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestApp;
use starsclub::domain::Role;

#[tokio::test]
async fn register_with_missing_fields_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/register")
        .json(&json!({ "username": "amy" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], 10007);
}

#[tokio::test]
async fn login_with_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/login")
        .content_type("application/json")
        .bytes("{ not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comment_rating_out_of_range_is_bad_request() {
    let app = TestApp::new();
    let token = app.access_token(4, Role::Member);

    let response = app
        .server
        .post("/api/posts/1/comments")
        .authorization_bearer(token)
        .json(&json!({
            "liked": "the plot",
            "disliked": "the pacing",
            "overall_impression": "worth reading",
            "rating": 9
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_with_unknown_status_is_bad_request() {
    let app = TestApp::new();
    let token = app.access_token(4, Role::Member);

    let response = app
        .server
        .post("/api/posts")
        .authorization_bearer(token)
        .json(&json!({ "title": "Hello", "content": "World", "status": "archived" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_role_requires_ids() {
    let app = TestApp::new();
    let token = app.access_token(1, Role::Admin);

    app.server
        .post("/api/admin/update-role")
        .authorization_bearer(token)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_of_unknown_report_is_bad_request() {
    let app = TestApp::new();
    let token = app.access_token(1, Role::Admin);

    app.server
        .get("/api/admin/reports/export/comments/pdf")
        .authorization_bearer(token.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .get("/api/admin/reports/export/users/xlsx")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn check_new_rejects_bad_timestamp() {
    let app = TestApp::new();
    let token = app.access_token(4, Role::Member);

    app.server
        .get("/api/notification/check-new")
        .add_query_param("last_checked", "yesterday-ish")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
