//! Notification entity and repository trait.
//!
//! Maps to the `notifications` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Notification type matching the database CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Comment,
    Subscription,
}

impl NotificationKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "comment" => Some(Self::Comment),
            "subscription" => Some(Self::Subscription),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Subscription => "subscription",
        }
    }
}

/// A notification joined with sender and post details.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub sender_id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub post_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub sender_username: Option<String>,
    pub sender_avatar: Option<String>,
    pub post_title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub sender_id: i64,
    pub kind: NotificationKind,
    pub post_id: Option<i64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &NewNotification) -> Result<(), AppError>;

    /// Notifications of a user, newest first.
    async fn list(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError>;

    async fn unread_count(&self, user_id: i64) -> Result<i64, AppError>;

    /// Unread notifications created after `since`.
    async fn count_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<i64, AppError>;

    /// Returns false when the notification does not belong to the user.
    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool, AppError>;

    async fn mark_all_read(&self, user_id: i64) -> Result<u64, AppError>;

    /// Delete notifications older than `days` days.
    async fn delete_older_than(&self, days: i64) -> Result<u64, AppError>;
}
