//! Post entity and repository trait.
//!
//! Maps to the `posts` table. A post optionally answers an event task and
//! carries the running average of its comment ratings.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Default page size for post listings.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Upper bound on requested page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Publication status matching the database CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored post.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub task_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub cover_image: Option<String>,
    pub rating: f64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post joined with its author and the task/event it answers.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub cover_image: Option<String>,
    pub rating: f64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub task_id: Option<i64>,
    pub author_id: i64,
    pub author_username: String,
    pub author_avatar: Option<String>,
    pub task_title: Option<String>,
    pub task_number: Option<i32>,
    pub event_title: Option<String>,
}

/// Fields for inserting a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub task_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub cover_image: Option<String>,
}

/// Partial update of a post; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
    pub cover_image: Option<String>,
    pub task_id: Option<i64>,
}

/// Sort order of the public feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    Popular,
    Rating,
}

impl PostSort {
    /// ORDER BY clause for the feed query.
    pub fn order_clause(&self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC",
            Self::Oldest => "p.created_at ASC",
            Self::Popular => "p.views DESC, p.rating DESC",
            Self::Rating => "p.rating DESC, p.created_at DESC",
        }
    }
}

/// Creation-time window of the public feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostPeriod {
    Today,
    Week,
    Month,
    Year,
}

impl PostPeriod {
    /// Earliest creation time inside the window. Windows are rolling and
    /// counted back from the start of the current day.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        match self {
            Self::Today => today,
            Self::Week => today - Duration::days(7),
            Self::Month => today - Duration::days(30),
            Self::Year => today
                .checked_sub_months(Months::new(12))
                .unwrap_or(today - Duration::days(365)),
        }
    }
}

/// Feed query with pagination.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub search: Option<String>,
    pub sort: PostSort,
    pub period: Option<PostPeriod>,
    pub page: u32,
    pub limit: u32,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: PostSort::default(),
            period: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PostQuery {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// One page of the feed plus the total match count.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub total: i64,
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: i64, limit: u32) -> i64 {
    if limit == 0 {
        return 0;
    }
    let limit = i64::from(limit);
    (total + limit - 1) / limit
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &NewPost) -> Result<Post, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// A post with author and task/event details.
    async fn find_view(&self, id: i64) -> Result<Option<PostView>, AppError>;

    async fn update(&self, id: i64, changes: &PostChanges) -> Result<Post, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Increment the view counter; `None` if the post does not exist.
    async fn increment_views(&self, id: i64) -> Result<Option<i64>, AppError>;

    /// Published posts matching the query.
    async fn search_published(&self, query: &PostQuery) -> Result<PostPage, AppError>;

    /// Published posts ordered by views, then rating.
    async fn popular(&self, limit: i64) -> Result<Vec<PostView>, AppError>;

    async fn by_task(&self, task_id: i64) -> Result<Vec<PostView>, AppError>;

    async fn by_author(&self, user_id: i64, published_only: bool)
        -> Result<Vec<PostView>, AppError>;

    /// Drop a cover image reference from every post using it.
    async fn clear_cover(&self, cover_image: &str) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case(PostPeriod::Today, (2026, 10, 19) ; "today starts at midnight")]
    #[test_case(PostPeriod::Week, (2026, 10, 12) ; "week is the last seven days")]
    #[test_case(PostPeriod::Month, (2026, 9, 19) ; "month is the last thirty days")]
    #[test_case(PostPeriod::Year, (2025, 10, 19) ; "year is the last twelve months")]
    fn period_cutoff_is_rolling(period: PostPeriod, (y, m, d): (i32, u32, u32)) {
        // A Monday, so a calendar-week window would start today.
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        assert_eq!(period.cutoff(now), expected);
    }

    #[test]
    fn week_window_keeps_yesterday_on_a_monday() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let sunday = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        assert!(sunday >= PostPeriod::Week.cutoff(now));
        assert!(sunday < PostPeriod::Today.cutoff(now));
    }

    #[test]
    fn status_parse_and_default() {
        assert_eq!(PostStatus::default(), PostStatus::Draft);
        assert_eq!(PostStatus::parse("Published"), Some(PostStatus::Published));
        assert_eq!(PostStatus::parse("archived"), None);
    }

    #[test_case(0, 12, 0)]
    #[test_case(1, 12, 1)]
    #[test_case(12, 12, 1)]
    #[test_case(13, 12, 2)]
    #[test_case(5, 0, 0)]
    fn pages(total: i64, limit: u32, expected: i64) {
        assert_eq!(total_pages(total, limit), expected);
    }

    #[test]
    fn offset_from_page() {
        let query = PostQuery {
            page: 3,
            limit: 12,
            ..PostQuery::default()
        };
        assert_eq!(query.offset(), 24);
        assert_eq!(PostQuery::default().offset(), 0);
    }
}
