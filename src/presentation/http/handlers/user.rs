//! User and Subscription Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::request::UpdateProfileRequest;
use crate::application::dto::response::{
    MessageResponse, ProfileResponse, SubscriptionStatusResponse,
};
use crate::application::services::{
    PublicProfile, SubscriptionService, SubscriptionServiceImpl, UserService, UserServiceImpl,
};
use crate::domain::{FollowCounts, PostView, ProfileChanges, UserSummary};
use crate::infrastructure::repositories::{
    PgNotificationRepository, PgPostRepository, PgSubscriptionRepository, PgUserRepository,
};
use crate::presentation::http::extractors::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

type Users = UserServiceImpl<PgUserRepository, PgSubscriptionRepository, PgPostRepository>;
type Subscriptions =
    SubscriptionServiceImpl<PgUserRepository, PgSubscriptionRepository, PgNotificationRepository>;

fn user_service(state: &AppState) -> Users {
    UserServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgSubscriptionRepository::new(state.db.clone())),
        Arc::new(PgPostRepository::new(state.db.clone())),
    )
}

fn subscription_service(state: &AppState) -> Subscriptions {
    SubscriptionServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgSubscriptionRepository::new(state.db.clone())),
        Arc::new(PgNotificationRepository::new(state.db.clone())),
    )
}

/// `GET /api/user/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = user_service(&state).profile(auth.user_id).await?;
    Ok(Json(user.into()))
}

/// `PUT /api/user/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let changes = ProfileChanges {
        username: body.username,
        phone: body.phone,
        about: body.about,
    };
    user_service(&state)
        .update_profile(auth.user_id, changes)
        .await?;
    Ok(Json(MessageResponse::new("Profile updated")))
}

/// `GET /api/user/user-stats`
pub async fn user_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<FollowCounts>, AppError> {
    Ok(Json(user_service(&state).stats(auth.user_id).await?))
}

/// `GET /api/user/new-authors`
pub async fn new_authors(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(user_service(&state).new_authors().await?))
}

/// `GET /api/user/{id}`
pub async fn public_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<PublicProfile>, AppError> {
    Ok(Json(user_service(&state).public_profile(user_id).await?))
}

/// `GET /api/user/{id}/followers`
pub async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(user_service(&state).followers(user_id).await?))
}

/// `GET /api/user/{id}/subscriptions`
pub async fn subscriptions(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(user_service(&state).subscriptions(user_id).await?))
}

/// `GET /api/user/user-posts`
pub async fn own_posts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PostView>>, AppError> {
    Ok(Json(user_service(&state).own_posts(auth.user_id).await?))
}

/// `POST /api/user/{id}/subscribe`
pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(target_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    subscription_service(&state)
        .subscribe(target_id, auth.user_id)
        .await?;
    Ok(Json(MessageResponse::new("Subscribed")))
}

/// `DELETE /api/user/{id}/unsubscribe`
pub async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(target_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    subscription_service(&state)
        .unsubscribe(target_id, auth.user_id)
        .await?;
    Ok(Json(MessageResponse::new("Unsubscribed")))
}

/// `GET /api/user/{id}/check-subscription`
pub async fn check_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(target_id): Path<i64>,
) -> Result<Json<SubscriptionStatusResponse>, AppError> {
    let is_subscribed = subscription_service(&state)
        .is_subscribed(target_id, auth.user_id)
        .await?;
    Ok(Json(SubscriptionStatusResponse { is_subscribed }))
}
