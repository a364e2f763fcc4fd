//! User Service
//!
//! Own profile management and public author pages.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    FollowCounts, PostRepository, PostView, ProfileChanges, SubscriptionRepository, User,
    UserRepository, UserSummary,
};
use crate::shared::error::AppError;

/// Number of accounts listed as new authors.
pub const NEW_AUTHORS_LIMIT: i64 = 5;

/// Public author page.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: i64,
    pub username: String,
    pub avatar: Option<String>,
    pub about: Option<String>,
    pub created_at: DateTime<Utc>,
    pub followers_count: i64,
    pub subscriptions_count: i64,
    pub posts: Vec<PostView>,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn profile(&self, user_id: i64) -> Result<User, UserError>;

    async fn update_profile(&self, user_id: i64, changes: ProfileChanges) -> Result<User, UserError>;

    async fn stats(&self, user_id: i64) -> Result<FollowCounts, UserError>;

    async fn public_profile(&self, user_id: i64) -> Result<PublicProfile, UserError>;

    async fn new_authors(&self) -> Result<Vec<UserSummary>, UserError>;

    async fn followers(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError>;

    async fn subscriptions(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError>;

    /// All posts of the caller regardless of status.
    async fn own_posts(&self, user_id: i64) -> Result<Vec<PostView>, UserError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => AppError::NotFound(e.to_string()),
            UserError::Store(inner) => inner,
        }
    }
}

pub struct UserServiceImpl<U, S, P>
where
    U: UserRepository,
    S: SubscriptionRepository,
    P: PostRepository,
{
    users: Arc<U>,
    subscriptions: Arc<S>,
    posts: Arc<P>,
}

impl<U, S, P> UserServiceImpl<U, S, P>
where
    U: UserRepository,
    S: SubscriptionRepository,
    P: PostRepository,
{
    pub fn new(users: Arc<U>, subscriptions: Arc<S>, posts: Arc<P>) -> Self {
        Self {
            users,
            subscriptions,
            posts,
        }
    }

    async fn require(&self, user_id: i64) -> Result<User, UserError> {
        self.users.find_by_id(user_id).await?.ok_or(UserError::NotFound)
    }
}

/// Treat blank strings as "leave unchanged".
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[async_trait]
impl<U, S, P> UserService for UserServiceImpl<U, S, P>
where
    U: UserRepository + 'static,
    S: SubscriptionRepository + 'static,
    P: PostRepository + 'static,
{
    async fn profile(&self, user_id: i64) -> Result<User, UserError> {
        self.require(user_id).await
    }

    async fn update_profile(&self, user_id: i64, changes: ProfileChanges) -> Result<User, UserError> {
        let changes = ProfileChanges {
            username: non_blank(changes.username),
            phone: non_blank(changes.phone),
            about: changes.about,
        };

        self.users
            .update_profile(user_id, &changes)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn stats(&self, user_id: i64) -> Result<FollowCounts, UserError> {
        Ok(self.subscriptions.counts(user_id).await?)
    }

    async fn public_profile(&self, user_id: i64) -> Result<PublicProfile, UserError> {
        let user = self.require(user_id).await?;
        let counts = self.subscriptions.counts(user_id).await?;
        let posts = self.posts.by_author(user_id, true).await?;

        Ok(PublicProfile {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            about: user.about,
            created_at: user.created_at,
            followers_count: counts.followers,
            subscriptions_count: counts.subscriptions,
            posts,
        })
    }

    async fn new_authors(&self) -> Result<Vec<UserSummary>, UserError> {
        Ok(self.users.newest(NEW_AUTHORS_LIMIT).await?)
    }

    async fn followers(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError> {
        self.require(user_id).await?;
        Ok(self.subscriptions.followers(user_id).await?)
    }

    async fn subscriptions(&self, user_id: i64) -> Result<Vec<UserSummary>, UserError> {
        self.require(user_id).await?;
        Ok(self.subscriptions.subscriptions(user_id).await?)
    }

    async fn own_posts(&self, user_id: i64) -> Result<Vec<PostView>, UserError> {
        Ok(self.posts.by_author(user_id, false).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockPostRepository, MockSubscriptionRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn user(id: i64) -> User {
        User {
            id,
            username: "carol".into(),
            phone: Some("+15550002".into()),
            password_hash: None,
            telegram_id: None,
            role_id: 2,
            avatar: Some("/uploads/avatars/a.png".into()),
            about: Some("writes haiku".into()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn public_profile_combines_counts_and_published_posts() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        let mut subs = MockSubscriptionRepository::new();
        subs.expect_counts().returning(|_| {
            Ok(FollowCounts {
                followers: 4,
                subscriptions: 2,
            })
        });
        let mut posts = MockPostRepository::new();
        posts
            .expect_by_author()
            .with(eq(5), eq(true))
            .returning(|_, _| Ok(vec![]));

        let service = UserServiceImpl::new(Arc::new(users), Arc::new(subs), Arc::new(posts));
        let profile = service.public_profile(5).await.unwrap();

        assert_eq!(profile.followers_count, 4);
        assert_eq!(profile.subscriptions_count, 2);
        assert_eq!(profile.username, "carol");
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let service = UserServiceImpl::new(
            Arc::new(users),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockPostRepository::new()),
        );

        assert!(matches!(service.profile(1).await, Err(UserError::NotFound)));
        assert!(matches!(service.followers(1).await, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn blank_profile_fields_are_left_unchanged() {
        let mut users = MockUserRepository::new();
        users
            .expect_update_profile()
            .withf(|id, c| *id == 3 && c.username.is_none() && c.phone.as_deref() == Some("+1"))
            .returning(|id, _| Ok(Some(user(id))));
        let service = UserServiceImpl::new(
            Arc::new(users),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockPostRepository::new()),
        );

        let changes = ProfileChanges {
            username: Some("   ".into()),
            phone: Some(" +1 ".into()),
            about: None,
        };
        assert!(service.update_profile(3, changes).await.is_ok());
    }
}
