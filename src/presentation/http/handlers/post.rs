//! Post Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreatePostRequest, PostQueryParams, UpdatePostRequest};
use crate::application::dto::response::{
    FeedResponse, MessageResponse, Pagination, PopularPostResponse, PostSavedResponse,
    ViewsResponse,
};
use crate::application::services::{created_message, PostService, PostServiceImpl};
use crate::domain::{NewPost, PostChanges, PostView};
use crate::infrastructure::repositories::PgPostRepository;
use crate::presentation::http::extractors::{ApiQuery, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn post_service(state: &AppState) -> PostServiceImpl<PgPostRepository> {
    PostServiceImpl::new(Arc::new(PgPostRepository::new(state.db.clone())))
}

/// `POST /api/posts`
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostSavedResponse>), AppError> {
    let post = post_service(&state)
        .create(NewPost {
            user_id: auth.user_id,
            task_id: body.task_id,
            title: body.title,
            content: body.content,
            status: body.status.unwrap_or_default(),
            cover_image: body.cover_image.filter(|c| !c.trim().is_empty()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostSavedResponse {
            message: created_message(post.status).into(),
            post_id: post.id,
        }),
    ))
}

/// `GET /api/posts`
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PostQueryParams>,
) -> Result<Json<FeedResponse>, AppError> {
    let (page, query) = post_service(&state).feed(params.into_query()).await?;
    Ok(Json(FeedResponse {
        pagination: Pagination::new(&query, page.total),
        posts: page.posts,
    }))
}

/// `GET /api/posts/{id}`
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostView>, AppError> {
    Ok(Json(post_service(&state).get(id).await?))
}

/// `PUT /api/posts/{id}`
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<PostSavedResponse>, AppError> {
    let changes = PostChanges {
        title: body.title,
        content: body.content,
        status: body.status,
        cover_image: body.cover_image,
        task_id: body.task_id,
    };
    let post = post_service(&state).update(id, auth.user_id, changes).await?;

    Ok(Json(PostSavedResponse {
        message: "Post updated".into(),
        post_id: post.id,
    }))
}

/// `DELETE /api/posts/{id}`
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    post_service(&state).delete(id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Post deleted")))
}

/// `PATCH /api/posts/{id}/views`
pub async fn increment_views(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ViewsResponse>, AppError> {
    let views = post_service(&state).record_view(id).await?;
    Ok(Json(ViewsResponse {
        success: true,
        views,
    }))
}

/// `GET /api/popular`
pub async fn popular_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PopularPostResponse>>, AppError> {
    let posts = post_service(&state).popular().await?;
    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// `GET /api/posts/task/{task_id}`
pub async fn posts_by_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> Result<Json<Vec<PostView>>, AppError> {
    Ok(Json(post_service(&state).by_task(task_id).await?))
}
