//! Subscription (follow) relation and repository trait.
//!
//! Maps to the `subscriptions` table: `follower_id` follows `user_id`.

use async_trait::async_trait;
use serde::Serialize;

use super::user::UserSummary;
use crate::shared::error::AppError;

/// Follower and following counts of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FollowCounts {
    pub followers: i64,
    pub subscriptions: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn exists(&self, user_id: i64, follower_id: i64) -> Result<bool, AppError>;

    async fn create(&self, user_id: i64, follower_id: i64) -> Result<(), AppError>;

    /// Returns false when there was nothing to delete.
    async fn delete(&self, user_id: i64, follower_id: i64) -> Result<bool, AppError>;

    /// Users following `user_id`.
    async fn followers(&self, user_id: i64) -> Result<Vec<UserSummary>, AppError>;

    /// Users that `follower_id` follows.
    async fn subscriptions(&self, follower_id: i64) -> Result<Vec<UserSummary>, AppError>;

    async fn counts(&self, user_id: i64) -> Result<FollowCounts, AppError>;
}
