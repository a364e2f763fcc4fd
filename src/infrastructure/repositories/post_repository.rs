//! Post Repository Implementation
//!
//! PostgreSQL implementation of the PostRepository trait. Feed queries are
//! assembled with `QueryBuilder` so every user-supplied value is bound.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::{
    NewPost, Post, PostChanges, PostPage, PostQuery, PostRepository, PostStatus, PostView,
};
use crate::shared::error::AppError;

const POST_COLUMNS: &str = "id, user_id, task_id, title, content, status, cover_image, rating, views, created_at, updated_at";

/// Projection shared by every joined post listing.
const VIEW_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.status, p.cover_image, p.rating, p.views,
           p.created_at, p.updated_at, p.task_id,
           u.id AS author_id, u.username AS author_username, u.avatar AS author_avatar,
           t.title AS task_title, t.task_number, e.title AS event_title
    FROM posts p
    JOIN users u ON u.id = p.user_id
    LEFT JOIN tasks t ON t.id = p.task_id
    LEFT JOIN events e ON e.id = t.event_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    user_id: i64,
    task_id: Option<i64>,
    title: String,
    content: String,
    status: String,
    cover_image: Option<String>,
    rating: f64,
    views: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_entity(self) -> Post {
        Post {
            id: self.id,
            user_id: self.user_id,
            task_id: self.task_id,
            title: self.title,
            content: self.content,
            status: PostStatus::parse(&self.status).unwrap_or_default(),
            cover_image: self.cover_image,
            rating: self.rating,
            views: self.views,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostViewRow {
    id: i64,
    title: String,
    content: String,
    status: String,
    cover_image: Option<String>,
    rating: f64,
    views: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    task_id: Option<i64>,
    author_id: i64,
    author_username: String,
    author_avatar: Option<String>,
    task_title: Option<String>,
    task_number: Option<i32>,
    event_title: Option<String>,
}

impl PostViewRow {
    fn into_view(self) -> PostView {
        PostView {
            id: self.id,
            title: self.title,
            content: self.content,
            status: PostStatus::parse(&self.status).unwrap_or_default(),
            cover_image: self.cover_image,
            rating: self.rating,
            views: self.views,
            created_at: self.created_at,
            updated_at: self.updated_at,
            task_id: self.task_id,
            author_id: self.author_id,
            author_username: self.author_username,
            author_avatar: self.author_avatar,
            task_title: self.task_title,
            task_number: self.task_number,
            event_title: self.event_title,
        }
    }
}

/// Append the feed filters shared by the page and count queries.
fn push_feed_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
    builder.push(" WHERE p.status = 'published'");
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        builder
            .push(" AND p.title ILIKE ")
            .push_bind(format!("%{}%", search.trim()));
    }
    if let Some(period) = query.period {
        builder
            .push(" AND p.created_at >= ")
            .push_bind(period.cutoff(Utc::now()));
    }
}

/// PostgreSQL post repository implementation.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: &NewPost) -> Result<Post, AppError> {
        let sql = format!(
            r#"
            INSERT INTO posts (user_id, task_id, title, content, status, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post.user_id)
            .bind(post.task_id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.status.as_str())
            .bind(&post.cover_image)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::BadRequest("Referenced task does not exist".into())
                }
                _ => AppError::Database(e),
            })?;

        Ok(row.into_entity())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PostRow::into_entity))
    }

    async fn find_view(&self, id: i64) -> Result<Option<PostView>, AppError> {
        let sql = format!("{} WHERE p.id = $1", VIEW_SELECT);
        let row = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PostViewRow::into_view))
    }

    async fn update(&self, id: i64, changes: &PostChanges) -> Result<Post, AppError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                status = COALESCE($4, status),
                cover_image = COALESCE($5, cover_image),
                task_id = COALESCE($6, task_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.content)
            .bind(changes.status.map(|s| s.as_str()))
            .bind(&changes.cover_image)
            .bind(changes.task_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
        Ok(row.into_entity())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_views(&self, id: i64) -> Result<Option<i64>, AppError> {
        let views: Option<i64> =
            sqlx::query_scalar("UPDATE posts SET views = views + 1 WHERE id = $1 RETURNING views")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(views)
    }

    async fn search_published(&self, query: &PostQuery) -> Result<PostPage, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        push_feed_filters(&mut count, query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut page = QueryBuilder::<Postgres>::new(VIEW_SELECT);
        push_feed_filters(&mut page, query);
        page.push(" ORDER BY ")
            .push(query.sort.order_clause())
            .push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(query.offset());
        let rows = page
            .build_query_as::<PostViewRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(PostPage {
            posts: rows.into_iter().map(PostViewRow::into_view).collect(),
            total,
        })
    }

    async fn popular(&self, limit: i64) -> Result<Vec<PostView>, AppError> {
        let sql = format!(
            "{} WHERE p.status = 'published' ORDER BY p.views DESC, p.rating DESC LIMIT $1",
            VIEW_SELECT
        );
        let rows = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PostViewRow::into_view).collect())
    }

    async fn by_task(&self, task_id: i64) -> Result<Vec<PostView>, AppError> {
        let sql = format!(
            "{} WHERE p.task_id = $1 AND p.status = 'published' ORDER BY p.created_at DESC",
            VIEW_SELECT
        );
        let rows = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PostViewRow::into_view).collect())
    }

    async fn by_author(
        &self,
        user_id: i64,
        published_only: bool,
    ) -> Result<Vec<PostView>, AppError> {
        let sql = format!(
            "{} WHERE p.user_id = $1 AND ($2 = FALSE OR p.status = 'published') ORDER BY p.created_at DESC",
            VIEW_SELECT
        );
        let rows = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(user_id)
            .bind(published_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PostViewRow::into_view).collect())
    }

    async fn clear_cover(&self, cover_image: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE posts SET cover_image = NULL WHERE cover_image = $1")
            .bind(cover_image)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
