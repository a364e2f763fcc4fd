//! Token and role enforcement tests

use axum::http::StatusCode;
use serde_json::json;
use test_case::test_case;

use crate::common::TestApp;
use starsclub::domain::Role;

#[test_case("/api/user/profile" ; "profile")]
#[test_case("/api/user/user-stats" ; "stats")]
#[test_case("/api/notification" ; "notifications")]
#[test_case("/api/notification/unread-count" ; "unread count")]
#[tokio::test]
async fn protected_route_requires_token(path: &str) {
    let app = TestApp::new();

    app.server
        .get(path)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_authorization_header_is_rejected() {
    let app = TestApp::new();

    app.server
        .get("/api/user/profile")
        .authorization("Token abc")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_cannot_authenticate() {
    let app = TestApp::new();
    let token = app.refresh_token(1, Role::Member);

    app.server
        .get("/api/user/profile")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_case(Role::Member ; "member")]
#[test_case(Role::TelegramMember ; "telegram member")]
#[tokio::test]
async fn admin_routes_forbid_other_roles(role: Role) {
    let app = TestApp::new();
    let token = app.access_token(2, role);

    app.server
        .get("/api/admin/users")
        .authorization_bearer(token.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post("/api/admin/update-role")
        .authorization_bearer(token)
        .json(&json!({ "user_id": 3, "role_id": 1 }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn event_writes_are_admin_only() {
    let app = TestApp::new();
    let token = app.access_token(2, Role::Member);

    app.server
        .delete("/api/events/1")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_route_without_token_is_unauthorized() {
    let app = TestApp::new();

    app.server
        .get("/api/admin/users")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
