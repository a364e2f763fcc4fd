//! Notification Service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Notification, NotificationRepository};
use crate::shared::error::AppError;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list(
        &self,
        user_id: i64,
        limit: Option<i64>,
        offset: Option<i64>,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationError>;

    async fn unread_count(&self, user_id: i64) -> Result<i64, NotificationError>;

    /// Unread notifications newer than `last_checked`; all unread ones when
    /// no timestamp is given.
    async fn check_new(
        &self,
        user_id: i64,
        last_checked: Option<DateTime<Utc>>,
    ) -> Result<i64, NotificationError>;

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<(), NotificationError>;

    async fn mark_all_read(&self, user_id: i64) -> Result<u64, NotificationError>;

    async fn clean_old(&self, days: Option<i64>) -> Result<u64, NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error("days: must be at least 1")]
    InvalidRetention,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound => AppError::NotFound(e.to_string()),
            NotificationError::InvalidRetention => AppError::Validation(e.to_string()),
            NotificationError::Store(inner) => inner,
        }
    }
}

pub struct NotificationServiceImpl<N>
where
    N: NotificationRepository,
{
    notifications: Arc<N>,
}

impl<N> NotificationServiceImpl<N>
where
    N: NotificationRepository,
{
    pub fn new(notifications: Arc<N>) -> Self {
        Self { notifications }
    }
}

#[async_trait]
impl<N> NotificationService for NotificationServiceImpl<N>
where
    N: NotificationRepository + 'static,
{
    async fn list(
        &self,
        user_id: i64,
        limit: Option<i64>,
        offset: Option<i64>,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        Ok(self
            .notifications
            .list(user_id, limit, offset, unread_only)
            .await?)
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64, NotificationError> {
        Ok(self.notifications.unread_count(user_id).await?)
    }

    async fn check_new(
        &self,
        user_id: i64,
        last_checked: Option<DateTime<Utc>>,
    ) -> Result<i64, NotificationError> {
        let count = match last_checked {
            Some(since) => self.notifications.count_since(user_id, since).await?,
            None => self.notifications.unread_count(user_id).await?,
        };
        Ok(count)
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<(), NotificationError> {
        if self.notifications.mark_read(id, user_id).await? {
            Ok(())
        } else {
            Err(NotificationError::NotFound)
        }
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64, NotificationError> {
        Ok(self.notifications.mark_all_read(user_id).await?)
    }

    async fn clean_old(&self, days: Option<i64>) -> Result<u64, NotificationError> {
        let days = days.unwrap_or(DEFAULT_RETENTION_DAYS);
        if days < 1 {
            return Err(NotificationError::InvalidRetention);
        }
        let deleted = self.notifications.delete_older_than(days).await?;
        tracing::info!(deleted, days, "Old notifications removed");
        Ok(deleted)
    }
}
