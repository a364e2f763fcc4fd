//! Comment entity and repository trait.
//!
//! Maps to the `comments` table. Each comment carries a 1..=5 rating that
//! feeds the post's average.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::error::AppError;

/// A structured review left on a post.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub liked: String,
    pub disliked: String,
    pub overall_impression: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub liked: String,
    pub disliked: String,
    pub overall_impression: String,
    pub rating: i32,
}

/// A stored comment together with the post's recomputed average.
#[derive(Debug, Clone)]
pub struct RatedComment {
    pub comment: Comment,
    pub average_rating: f64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments of a post, newest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError>;

    /// In one transaction: insert the comment, notify `notify_user_id` if
    /// given, then recompute and store the post's average rating.
    async fn create_rated(
        &self,
        comment: &NewComment,
        notify_user_id: Option<i64>,
    ) -> Result<RatedComment, AppError>;
}
