//! Comment Repository Implementation
//!
//! PostgreSQL implementation of the CommentRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::services::average_rating;
use crate::domain::{Comment, CommentRepository, NewComment, NotificationKind, RatedComment};
use crate::infrastructure::database::with_transaction;
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    username: String,
    liked: String,
    disliked: String,
    overall_impression: String,
    rating: i32,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_entity(self) -> Comment {
        Comment {
            id: self.id,
            post_id: self.post_id,
            user_id: self.user_id,
            username: self.username,
            liked: self.liked,
            disliked: self.disliked,
            overall_impression: self.overall_impression,
            rating: self.rating,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL comment repository implementation.
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.user_id, u.username, c.liked, c.disliked,
                   c.overall_impression, c.rating, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_entity).collect())
    }

    async fn create_rated(
        &self,
        comment: &NewComment,
        notify_user_id: Option<i64>,
    ) -> Result<RatedComment, AppError> {
        with_transaction(&self.pool, |mut tx| async move {
            // Serialize rating recomputation per post.
            sqlx::query("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(comment.post_id)
                .fetch_optional(tx.executor())
                .await?
                .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

            let row = sqlx::query_as::<_, CommentRow>(
                r#"
                WITH inserted AS (
                    INSERT INTO comments (post_id, user_id, liked, disliked, overall_impression, rating)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING *
                )
                SELECT i.id, i.post_id, i.user_id, u.username, i.liked, i.disliked,
                       i.overall_impression, i.rating, i.created_at
                FROM inserted i
                JOIN users u ON u.id = i.user_id
                "#,
            )
            .bind(comment.post_id)
            .bind(comment.user_id)
            .bind(&comment.liked)
            .bind(&comment.disliked)
            .bind(&comment.overall_impression)
            .bind(comment.rating)
            .fetch_one(tx.executor())
            .await?;

            if let Some(recipient) = notify_user_id {
                sqlx::query(
                    "INSERT INTO notifications (user_id, sender_id, type, post_id) VALUES ($1, $2, $3, $4)",
                )
                .bind(recipient)
                .bind(comment.user_id)
                .bind(NotificationKind::Comment.as_str())
                .bind(comment.post_id)
                .execute(tx.executor())
                .await?;
            }

            let ratings: Vec<i32> =
                sqlx::query_scalar("SELECT rating FROM comments WHERE post_id = $1")
                    .bind(comment.post_id)
                    .fetch_all(tx.executor())
                    .await?;
            let average = average_rating(&ratings);

            sqlx::query("UPDATE posts SET rating = $2 WHERE id = $1")
                .bind(comment.post_id)
                .bind(average)
                .execute(tx.executor())
                .await?;

            Ok((
                RatedComment {
                    comment: row.into_entity(),
                    average_rating: average,
                },
                tx,
            ))
        })
        .await
    }
}
