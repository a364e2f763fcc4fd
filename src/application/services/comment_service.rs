//! Comment Service
//!
//! Rated reviews on posts. Storing a comment also refreshes the post's
//! average rating and notifies its author.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Comment, CommentRepository, NewComment, PostRepository, RatedComment};
use crate::shared::error::AppError;

#[async_trait]
pub trait CommentService: Send + Sync {
    async fn list(&self, post_id: i64) -> Result<Vec<Comment>, CommentError>;

    async fn create(&self, comment: NewComment) -> Result<RatedComment, CommentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("Post not found")]
    PostNotFound,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<CommentError> for AppError {
    fn from(e: CommentError) -> Self {
        match e {
            CommentError::PostNotFound => AppError::NotFound(e.to_string()),
            CommentError::Store(inner) => inner,
        }
    }
}

pub struct CommentServiceImpl<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    comments: Arc<C>,
    posts: Arc<P>,
}

impl<C, P> CommentServiceImpl<C, P>
where
    C: CommentRepository,
    P: PostRepository,
{
    pub fn new(comments: Arc<C>, posts: Arc<P>) -> Self {
        Self { comments, posts }
    }
}

#[async_trait]
impl<C, P> CommentService for CommentServiceImpl<C, P>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    async fn list(&self, post_id: i64) -> Result<Vec<Comment>, CommentError> {
        Ok(self.comments.list_for_post(post_id).await?)
    }

    async fn create(&self, comment: NewComment) -> Result<RatedComment, CommentError> {
        let post = self
            .posts
            .find_by_id(comment.post_id)
            .await?
            .ok_or(CommentError::PostNotFound)?;

        // Authors reviewing their own post get no notification.
        let notify = (post.user_id != comment.user_id).then_some(post.user_id);

        let rated = self.comments.create_rated(&comment, notify).await?;
        tracing::debug!(
            post_id = comment.post_id,
            user_id = comment.user_id,
            average = rated.average_rating,
            "Comment stored"
        );
        Ok(rated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockCommentRepository, MockPostRepository, Post, PostStatus};
    use chrono::Utc;
    use mockall::predicate::{always, eq};

    fn post_by(user_id: i64) -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            user_id,
            task_id: None,
            title: "t".into(),
            content: "c".into(),
            status: PostStatus::Published,
            cover_image: None,
            rating: 0.0,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn review(user_id: i64) -> NewComment {
        NewComment {
            post_id: 1,
            user_id,
            liked: "pacing".into(),
            disliked: "ending".into(),
            overall_impression: "good".into(),
            rating: 4,
        }
    }

    fn rated(comment: &NewComment) -> RatedComment {
        RatedComment {
            comment: Comment {
                id: 1,
                post_id: comment.post_id,
                user_id: comment.user_id,
                username: "dave".into(),
                liked: comment.liked.clone(),
                disliked: comment.disliked.clone(),
                overall_impression: comment.overall_impression.clone(),
                rating: comment.rating,
                created_at: Utc::now(),
            },
            average_rating: 4.0,
        }
    }

    #[tokio::test]
    async fn notifies_author_of_foreign_review() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().returning(|_| Ok(Some(post_by(10))));
        let mut comments = MockCommentRepository::new();
        comments
            .expect_create_rated()
            .with(always(), eq(Some(10)))
            .times(1)
            .returning(|c, _| Ok(rated(c)));

        let service = CommentServiceImpl::new(Arc::new(comments), Arc::new(posts));
        let result = service.create(review(20)).await.unwrap();
        assert_eq!(result.average_rating, 4.0);
    }

    #[tokio::test]
    async fn own_review_is_not_notified() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().returning(|_| Ok(Some(post_by(10))));
        let mut comments = MockCommentRepository::new();
        comments
            .expect_create_rated()
            .with(always(), eq(None))
            .times(1)
            .returning(|c, _| Ok(rated(c)));

        let service = CommentServiceImpl::new(Arc::new(comments), Arc::new(posts));
        assert!(service.create(review(10)).await.is_ok());
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().returning(|_| Ok(None));
        let mut comments = MockCommentRepository::new();
        comments.expect_create_rated().never();

        let service = CommentServiceImpl::new(Arc::new(comments), Arc::new(posts));
        assert!(matches!(
            service.create(review(10)).await,
            Err(CommentError::PostNotFound)
        ));
    }
}
