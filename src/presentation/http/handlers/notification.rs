//! Notification Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::request::{CheckNewQuery, CleanOldQuery, NotificationQueryParams};
use crate::application::dto::response::{
    CheckNewResponse, CountResponse, MessageResponse, NotificationListResponse,
};
use crate::application::services::{NotificationService, NotificationServiceImpl};
use crate::infrastructure::repositories::PgNotificationRepository;
use crate::presentation::http::extractors::ApiQuery;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_timestamp;
use crate::startup::AppState;

fn notification_service(state: &AppState) -> NotificationServiceImpl<PgNotificationRepository> {
    NotificationServiceImpl::new(Arc::new(PgNotificationRepository::new(state.db.clone())))
}

/// `GET /api/notification`
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<NotificationQueryParams>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let notifications = notification_service(&state)
        .list(auth.user_id, params.limit, params.offset, params.unread_only)
        .await?;
    Ok(Json(notifications.into()))
}

/// `GET /api/notification/unread-count`
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CountResponse>, AppError> {
    let count = notification_service(&state).unread_count(auth.user_id).await?;
    Ok(Json(CountResponse {
        success: true,
        count,
    }))
}

/// `GET /api/notification/check-new?last_checked=`
pub async fn check_new(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<CheckNewQuery>,
) -> Result<Json<CheckNewResponse>, AppError> {
    let since = match query.last_checked.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| {
            AppError::Validation("last_checked: invalid timestamp".into())
        })?),
        None => None,
    };

    let count = notification_service(&state)
        .check_new(auth.user_id, since)
        .await?;
    Ok(Json(CheckNewResponse {
        success: true,
        has_new: count > 0,
        count,
    }))
}

/// `PUT /api/notification/{id}/read`
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    notification_service(&state).mark_read(id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Notification marked as read")))
}

/// `PUT /api/notification/mark-all-read`
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CountResponse>, AppError> {
    let marked = notification_service(&state).mark_all_read(auth.user_id).await?;
    Ok(Json(CountResponse {
        success: true,
        count: marked as i64,
    }))
}

/// `DELETE /api/notification/clean-old?days=`
pub async fn clean_old(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CleanOldQuery>,
) -> Result<Json<CountResponse>, AppError> {
    let deleted = notification_service(&state).clean_old(query.days).await?;
    Ok(Json(CountResponse {
        success: true,
        count: deleted as i64,
    }))
}
