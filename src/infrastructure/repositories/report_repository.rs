//! Report Repository Implementation
//!
//! Aggregate queries behind the admin reports. The optional range is
//! bound as two nullable parameters so the same statement serves every
//! period.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    round2, AuthorStanding, PostReport, PostStanding, ReportRange, ReportRepository, UserReport,
};
use crate::shared::error::AppError;

/// Published posts inside the optional range, aliased `p`.
const IN_RANGE: &str =
    "p.status = 'published' AND ($1::TIMESTAMPTZ IS NULL OR p.created_at >= $1) AND ($2::TIMESTAMPTZ IS NULL OR p.created_at <= $2)";

#[derive(Debug, sqlx::FromRow)]
struct AuthorStandingRow {
    id: i64,
    username: String,
    posts_count: i64,
    avg_rating: Option<f64>,
    total_views: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct PostStandingRow {
    id: i64,
    title: String,
    author: String,
    views: i64,
    rating: f64,
    created_at: DateTime<Utc>,
}

fn bounds(range: Option<ReportRange>) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match range {
        Some(r) => (Some(r.start), Some(r.end)),
        None => (None, None),
    }
}

/// PostgreSQL report repository implementation.
#[derive(Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn user_report(&self, range: Option<ReportRange>) -> Result<UserReport, AppError> {
        let (start, end) = bounds(range);

        let (active_users, avg_rating): (i64, Option<f64>) = sqlx::query_as(&format!(
            "SELECT COUNT(DISTINCT p.user_id), AVG(p.rating) FROM posts p WHERE {}",
            IN_RANGE
        ))
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, AuthorStandingRow>(&format!(
            r#"
            SELECT u.id, u.username, COUNT(p.id) AS posts_count,
                   AVG(p.rating) AS avg_rating, SUM(p.views)::BIGINT AS total_views
            FROM users u
            JOIN posts p ON p.user_id = u.id
            WHERE {}
            GROUP BY u.id, u.username
            ORDER BY posts_count DESC, total_views DESC
            LIMIT 10
            "#,
            IN_RANGE
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserReport {
            active_users_count: active_users,
            average_user_rating: round2(avg_rating.unwrap_or(0.0)),
            most_active_users: rows
                .into_iter()
                .map(|r| AuthorStanding {
                    id: r.id,
                    username: r.username,
                    posts_count: r.posts_count,
                    average_rating: round2(r.avg_rating.unwrap_or(0.0)),
                    total_views: r.total_views.unwrap_or(0),
                })
                .collect(),
        })
    }

    async fn post_report(&self, range: Option<ReportRange>) -> Result<PostReport, AppError> {
        let (start, end) = bounds(range);

        let (total_views, avg_rating): (Option<i64>, Option<f64>) = sqlx::query_as(&format!(
            "SELECT SUM(p.views)::BIGINT, AVG(p.rating) FROM posts p WHERE {}",
            IN_RANGE
        ))
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, PostStandingRow>(&format!(
            r#"
            SELECT p.id, p.title, u.username AS author, p.views, p.rating, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE {} AND p.views >= 5 AND p.rating >= 1
            ORDER BY (LN(1 + p.views::DOUBLE PRECISION) * 0.5 + p.rating * 0.5) DESC
            LIMIT 10
            "#,
            IN_RANGE
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(PostReport {
            total_views: total_views.unwrap_or(0),
            average_post_rating: round2(avg_rating.unwrap_or(0.0)),
            popular_posts: rows
                .into_iter()
                .map(|r| PostStanding {
                    id: r.id,
                    title: r.title,
                    author: r.author,
                    views: r.views,
                    rating: round2(r.rating),
                    created_at: r.created_at,
                })
                .collect(),
        })
    }
}
