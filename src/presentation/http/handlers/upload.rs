//! Avatar and Cover Upload Handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use crate::application::dto::response::{AvatarResponse, CountResponse, CoverResponse, MessageResponse};
use crate::application::services::{MediaService, MediaServiceImpl};
use crate::infrastructure::repositories::{PgPostRepository, PgUserRepository};
use crate::presentation::http::multipart::FormData;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn media_service(state: &AppState) -> MediaServiceImpl<PgUserRepository, PgPostRepository> {
    MediaServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgPostRepository::new(state.db.clone())),
        state.storage.clone(),
    )
}

/// `POST /api/avatar/upload` (multipart field `avatar`)
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<AvatarResponse>, AppError> {
    let file = FormData::read(multipart).await?.require_file("avatar")?;
    let avatar = media_service(&state).upload_avatar(auth.user_id, file).await?;
    Ok(Json(AvatarResponse {
        success: true,
        avatar,
    }))
}

/// `DELETE /api/avatar/delete`
pub async fn delete_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    media_service(&state).delete_avatar(auth.user_id).await?;
    Ok(Json(MessageResponse::new("Avatar deleted")))
}

/// `POST /api/cover/upload` (multipart field `cover`)
pub async fn upload_cover(
    State(state): State<AppState>,
    _auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<CoverResponse>, AppError> {
    let file = FormData::read(multipart).await?.require_file("cover")?;
    let cover_url = media_service(&state).upload_cover(file).await?;
    Ok(Json(CoverResponse {
        success: true,
        cover_url,
    }))
}

/// `DELETE /api/cover/{filename}`; the count is the number of posts cleared.
pub async fn delete_cover(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(file_name): Path<String>,
) -> Result<Json<CountResponse>, AppError> {
    let cleared = media_service(&state).delete_cover(&file_name).await?;
    Ok(Json(CountResponse {
        success: true,
        count: cleared as i64,
    }))
}
