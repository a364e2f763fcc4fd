//! Post Service
//!
//! Authoring, the public feed, and view counting.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    NewPost, Post, PostChanges, PostPage, PostQuery, PostRepository, PostStatus, PostView,
    MAX_PAGE_SIZE,
};
use crate::shared::error::AppError;

/// Number of posts on the popular shelf.
pub const POPULAR_LIMIT: i64 = 5;

#[async_trait]
pub trait PostService: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, PostError>;

    /// Published posts, clamped to valid paging.
    async fn feed(&self, query: PostQuery) -> Result<(PostPage, PostQuery), PostError>;

    async fn get(&self, id: i64) -> Result<PostView, PostError>;

    async fn update(&self, id: i64, user_id: i64, changes: PostChanges) -> Result<Post, PostError>;

    async fn delete(&self, id: i64, user_id: i64) -> Result<(), PostError>;

    async fn record_view(&self, id: i64) -> Result<i64, PostError>;

    async fn popular(&self) -> Result<Vec<PostView>, PostError>;

    async fn by_task(&self, task_id: i64) -> Result<Vec<PostView>, PostError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("You can only modify your own posts")]
    NotOwner,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<PostError> for AppError {
    fn from(e: PostError) -> Self {
        match e {
            PostError::NotFound => AppError::NotFound(e.to_string()),
            PostError::NotOwner => AppError::Forbidden(e.to_string()),
            PostError::Store(inner) => inner,
        }
    }
}

/// Message returned after creating a post.
pub fn created_message(status: PostStatus) -> &'static str {
    match status {
        PostStatus::Draft => "Draft saved",
        PostStatus::Published => "Post published",
    }
}

/// Clamp page to at least 1 and limit to `1..=MAX_PAGE_SIZE`.
pub fn normalize_query(mut query: PostQuery) -> PostQuery {
    query.page = query.page.max(1);
    query.limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    query.search = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    query
}

pub struct PostServiceImpl<P>
where
    P: PostRepository,
{
    posts: Arc<P>,
}

impl<P> PostServiceImpl<P>
where
    P: PostRepository,
{
    pub fn new(posts: Arc<P>) -> Self {
        Self { posts }
    }

    /// Load a post and check the caller authored it.
    async fn owned(&self, id: i64, user_id: i64) -> Result<Post, PostError> {
        let post = self.posts.find_by_id(id).await?.ok_or(PostError::NotFound)?;
        if post.user_id != user_id {
            return Err(PostError::NotOwner);
        }
        Ok(post)
    }
}

#[async_trait]
impl<P> PostService for PostServiceImpl<P>
where
    P: PostRepository + 'static,
{
    async fn create(&self, post: NewPost) -> Result<Post, PostError> {
        let created = self.posts.create(&post).await?;
        tracing::info!(post_id = created.id, user_id = created.user_id, status = %created.status, "Post created");
        Ok(created)
    }

    async fn feed(&self, query: PostQuery) -> Result<(PostPage, PostQuery), PostError> {
        let query = normalize_query(query);
        let page = self.posts.search_published(&query).await?;
        Ok((page, query))
    }

    async fn get(&self, id: i64) -> Result<PostView, PostError> {
        self.posts.find_view(id).await?.ok_or(PostError::NotFound)
    }

    async fn update(&self, id: i64, user_id: i64, changes: PostChanges) -> Result<Post, PostError> {
        self.owned(id, user_id).await?;
        Ok(self.posts.update(id, &changes).await?)
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<(), PostError> {
        self.owned(id, user_id).await?;
        self.posts.delete(id).await?;
        tracing::info!(post_id = id, user_id, "Post deleted");
        Ok(())
    }

    async fn record_view(&self, id: i64) -> Result<i64, PostError> {
        self.posts.increment_views(id).await?.ok_or(PostError::NotFound)
    }

    async fn popular(&self) -> Result<Vec<PostView>, PostError> {
        Ok(self.posts.popular(POPULAR_LIMIT).await?)
    }

    async fn by_task(&self, task_id: i64) -> Result<Vec<PostView>, PostError> {
        Ok(self.posts.by_task(task_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockPostRepository;
    use axum::http::StatusCode;
    use chrono::Utc;
    use test_case::test_case;

    fn post(id: i64, user_id: i64) -> Post {
        let now = Utc::now();
        Post {
            id,
            user_id,
            task_id: None,
            title: "Night train".into(),
            content: "...".into(),
            status: PostStatus::Published,
            cover_image: None,
            rating: 0.0,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test_case(0, 0, 1, 1)]
    #[test_case(2, 12, 2, 12)]
    #[test_case(1, 500, 1, 100)]
    fn paging_is_clamped(page: u32, limit: u32, want_page: u32, want_limit: u32) {
        let query = normalize_query(PostQuery {
            page,
            limit,
            ..PostQuery::default()
        });
        assert_eq!((query.page, query.limit), (want_page, want_limit));
    }

    #[test]
    fn blank_search_is_dropped() {
        let query = normalize_query(PostQuery {
            search: Some("   ".into()),
            ..PostQuery::default()
        });
        assert_eq!(query.search, None);
    }

    #[tokio::test]
    async fn only_owner_may_update() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(post(id, 1))));
        repo.expect_update().never();

        let service = PostServiceImpl::new(Arc::new(repo));
        let err = service
            .update(8, 2, PostChanges::default())
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn deleting_missing_post_is_not_found() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = PostServiceImpl::new(Arc::new(repo));
        let err = service.delete(8, 2).await.unwrap_err();
        assert_eq!(AppError::from(err).status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn owner_deletes() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_id().returning(|id| Ok(Some(post(id, 2))));
        repo.expect_delete().times(1).returning(|_| Ok(()));

        let service = PostServiceImpl::new(Arc::new(repo));
        assert!(service.delete(8, 2).await.is_ok());
    }

    #[tokio::test]
    async fn views_of_missing_post() {
        let mut repo = MockPostRepository::new();
        repo.expect_increment_views().returning(|_| Ok(None));

        let service = PostServiceImpl::new(Arc::new(repo));
        assert!(matches!(service.record_view(3).await, Err(PostError::NotFound)));
    }
}
