//! Aggregated admin report data and the repository computing it.
//!
//! Only published posts are counted. A `None` range means all time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::error::AppError;

/// Inclusive creation-time range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// An author ranked by output.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorStanding {
    pub id: i64,
    pub username: String,
    pub posts_count: i64,
    pub average_rating: f64,
    pub total_views: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserReport {
    pub active_users_count: i64,
    pub average_user_rating: f64,
    pub most_active_users: Vec<AuthorStanding>,
}

/// A post ranked by the blended views/rating score.
#[derive(Debug, Clone, Serialize)]
pub struct PostStanding {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub views: i64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostReport {
    pub total_views: i64,
    pub average_post_rating: f64,
    pub popular_posts: Vec<PostStanding>,
}

/// Round to two decimals for report output.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn user_report(&self, range: Option<ReportRange>) -> Result<UserReport, AppError>;

    async fn post_report(&self, range: Option<ReportRange>) -> Result<PostReport, AppError>;
}
