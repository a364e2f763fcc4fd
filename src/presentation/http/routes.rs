//! Route Configuration
//!
//! Configures all HTTP routes for the API. Routers for the same path but
//! different access levels are merged; `route_layer` only guards the routes
//! of its own group.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::services::ServeDir;

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{admin_only, auth_middleware};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.storage.root());

    Router::new()
        .nest("/api", api_routes(state.clone()))
        // Uploaded images, read-only
        .nest_service("/uploads", uploads)
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(admin_routes(state))
}

/// Routes open to anonymous callers
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh-token", post(handlers::auth::refresh_token))
        .route("/verify-tg-code", get(handlers::telegram::verify_code))
        .route("/posts", get(handlers::post::list_posts))
        .route("/posts/{id}", get(handlers::post::get_post))
        .route("/posts/{id}/views", patch(handlers::post::increment_views))
        .route("/posts/{id}/comments", get(handlers::comment::list_comments))
        .route("/popular", get(handlers::post::popular_posts))
        .route("/user/new-authors", get(handlers::user::new_authors))
        .route("/user/{id}", get(handlers::user::public_profile))
        .route("/user/{id}/followers", get(handlers::user::followers))
        .route("/user/{id}/subscriptions", get(handlers::user::subscriptions))
        .route("/events", get(handlers::event::list_events))
        .route("/events/{id}", get(handlers::event::get_event))
}

/// Routes requiring a valid access token
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Profile
        .route(
            "/user/profile",
            get(handlers::user::get_profile).put(handlers::user::update_profile),
        )
        .route("/user/user-stats", get(handlers::user::user_stats))
        .route("/user/user-posts", get(handlers::user::own_posts))
        .route("/user/{id}/subscribe", post(handlers::user::subscribe))
        .route("/user/{id}/unsubscribe", delete(handlers::user::unsubscribe))
        .route(
            "/user/{id}/check-subscription",
            get(handlers::user::check_subscription),
        )
        // Posts and comments
        .route("/posts", post(handlers::post::create_post))
        .route(
            "/posts/{id}",
            put(handlers::post::update_post).delete(handlers::post::delete_post),
        )
        .route("/posts/task/{task_id}", get(handlers::post::posts_by_task))
        .route("/posts/{id}/comments", post(handlers::comment::create_comment))
        // Event tasks
        .route("/events/{id}/tasks", get(handlers::event::list_tasks))
        .route("/events/{id}/tasks/{task_id}", get(handlers::event::get_task))
        // Notifications
        .route(
            "/notification",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notification/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notification/check-new",
            get(handlers::notification::check_new),
        )
        .route(
            "/notification/mark-all-read",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notification/{id}/read",
            put(handlers::notification::mark_read),
        )
        // Uploads
        .route("/avatar/upload", post(handlers::upload::upload_avatar))
        .route("/avatar/delete", delete(handlers::upload::delete_avatar))
        .route("/cover/upload", post(handlers::upload::upload_cover))
        .route("/cover/{filename}", delete(handlers::upload::delete_cover))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Routes requiring the admin role. The auth layer is added last so it runs
/// before the role check.
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/update-role", post(handlers::admin::update_role))
        .route("/admin/reports/users", get(handlers::report::users_report))
        .route("/admin/reports/posts", get(handlers::report::posts_report))
        .route(
            "/admin/reports/export/{type}/{format}",
            get(handlers::report::export_report),
        )
        .route("/events", post(handlers::event::create_event))
        .route(
            "/events/{id}",
            put(handlers::event::update_event).delete(handlers::event::delete_event),
        )
        .route("/events/{id}/tasks", post(handlers::event::create_task))
        .route(
            "/events/{id}/tasks/{task_id}",
            put(handlers::event::update_task).delete(handlers::event::delete_task),
        )
        .route(
            "/notification/clean-old",
            delete(handlers::notification::clean_old),
        )
        .route_layer(middleware::from_fn(admin_only))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
