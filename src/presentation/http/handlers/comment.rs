//! Comment Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::CreateCommentRequest;
use crate::application::dto::response::{CommentCreatedResponse, RatedCommentData};
use crate::application::services::{CommentService, CommentServiceImpl};
use crate::domain::{Comment, NewComment};
use crate::infrastructure::repositories::{PgCommentRepository, PgPostRepository};
use crate::presentation::http::extractors::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn comment_service(state: &AppState) -> CommentServiceImpl<PgCommentRepository, PgPostRepository> {
    CommentServiceImpl::new(
        Arc::new(PgCommentRepository::new(state.db.clone())),
        Arc::new(PgPostRepository::new(state.db.clone())),
    )
}

/// `GET /api/posts/{post_id}/comments`
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(comment_service(&state).list(post_id).await?))
}

/// `POST /api/posts/{post_id}/comments`
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentCreatedResponse>), AppError> {
    let rated = comment_service(&state)
        .create(NewComment {
            post_id,
            user_id: auth.user_id,
            liked: body.liked,
            disliked: body.disliked,
            overall_impression: body.overall_impression,
            rating: body.rating,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentCreatedResponse {
            success: true,
            data: RatedCommentData {
                comment: rated.comment,
                average_rating: rated.average_rating,
            },
        }),
    ))
}
