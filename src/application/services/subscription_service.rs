//! Subscription Service
//!
//! Following other authors. A subscription notifies the followed user.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    NewNotification, NotificationKind, NotificationRepository, SubscriptionRepository,
    UserRepository,
};
use crate::shared::error::AppError;

#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn subscribe(&self, target_id: i64, follower_id: i64) -> Result<(), SubscriptionError>;

    async fn unsubscribe(&self, target_id: i64, follower_id: i64) -> Result<(), SubscriptionError>;

    async fn is_subscribed(&self, target_id: i64, follower_id: i64)
        -> Result<bool, SubscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("You cannot subscribe to yourself")]
    SelfSubscription,

    #[error("User not found")]
    UserNotFound,

    #[error("Already subscribed")]
    AlreadySubscribed,

    #[error("Not subscribed")]
    NotSubscribed,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<SubscriptionError> for AppError {
    fn from(e: SubscriptionError) -> Self {
        match e {
            SubscriptionError::UserNotFound => AppError::NotFound(e.to_string()),
            SubscriptionError::SelfSubscription
            | SubscriptionError::AlreadySubscribed
            | SubscriptionError::NotSubscribed => AppError::BadRequest(e.to_string()),
            SubscriptionError::Store(inner) => inner,
        }
    }
}

pub struct SubscriptionServiceImpl<U, S, N>
where
    U: UserRepository,
    S: SubscriptionRepository,
    N: NotificationRepository,
{
    users: Arc<U>,
    subscriptions: Arc<S>,
    notifications: Arc<N>,
}

impl<U, S, N> SubscriptionServiceImpl<U, S, N>
where
    U: UserRepository,
    S: SubscriptionRepository,
    N: NotificationRepository,
{
    pub fn new(users: Arc<U>, subscriptions: Arc<S>, notifications: Arc<N>) -> Self {
        Self {
            users,
            subscriptions,
            notifications,
        }
    }
}

#[async_trait]
impl<U, S, N> SubscriptionService for SubscriptionServiceImpl<U, S, N>
where
    U: UserRepository + 'static,
    S: SubscriptionRepository + 'static,
    N: NotificationRepository + 'static,
{
    async fn subscribe(&self, target_id: i64, follower_id: i64) -> Result<(), SubscriptionError> {
        if target_id == follower_id {
            return Err(SubscriptionError::SelfSubscription);
        }
        if self.users.find_by_id(target_id).await?.is_none() {
            return Err(SubscriptionError::UserNotFound);
        }
        if self.subscriptions.exists(target_id, follower_id).await? {
            return Err(SubscriptionError::AlreadySubscribed);
        }

        self.subscriptions.create(target_id, follower_id).await?;
        self.notifications
            .create(&NewNotification {
                user_id: target_id,
                sender_id: follower_id,
                kind: NotificationKind::Subscription,
                post_id: None,
            })
            .await?;

        tracing::debug!(user_id = target_id, follower_id, "Subscribed");
        Ok(())
    }

    async fn unsubscribe(&self, target_id: i64, follower_id: i64) -> Result<(), SubscriptionError> {
        if self.subscriptions.delete(target_id, follower_id).await? {
            Ok(())
        } else {
            Err(SubscriptionError::NotSubscribed)
        }
    }

    async fn is_subscribed(
        &self,
        target_id: i64,
        follower_id: i64,
    ) -> Result<bool, SubscriptionError> {
        Ok(self.subscriptions.exists(target_id, follower_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MockNotificationRepository, MockSubscriptionRepository, MockUserRepository, User,
    };
    use axum::http::StatusCode;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn someone(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            phone: None,
            password_hash: None,
            telegram_id: None,
            role_id: 2,
            avatar: None,
            about: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn self_subscription_is_rejected() {
        let service = SubscriptionServiceImpl::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockNotificationRepository::new()),
        );

        let err = service.subscribe(4, 4).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::SelfSubscription));
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn second_subscription_is_rejected() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(someone(id))));

        let stored = Arc::new(AtomicBool::new(false));
        let mut subs = MockSubscriptionRepository::new();
        let seen = stored.clone();
        subs.expect_exists()
            .returning(move |_, _| Ok(seen.load(Ordering::SeqCst)));
        let written = stored.clone();
        subs.expect_create().times(1).returning(move |_, _| {
            written.store(true, Ordering::SeqCst);
            Ok(())
        });

        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_create()
            .withf(|n| {
                n.user_id == 1 && n.sender_id == 2 && n.kind == NotificationKind::Subscription
            })
            .times(1)
            .returning(|_| Ok(()));

        let service =
            SubscriptionServiceImpl::new(Arc::new(users), Arc::new(subs), Arc::new(notifications));

        service.subscribe(1, 2).await.unwrap();
        let err = service.subscribe(1, 2).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::AlreadySubscribed));
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let service = SubscriptionServiceImpl::new(
            Arc::new(users),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(MockNotificationRepository::new()),
        );

        assert!(matches!(
            service.subscribe(10, 2).await.unwrap_err(),
            SubscriptionError::UserNotFound
        ));
    }

    #[tokio::test]
    async fn unsubscribing_without_subscription_is_rejected() {
        let mut subs = MockSubscriptionRepository::new();
        subs.expect_delete().returning(|_, _| Ok(false));
        let service = SubscriptionServiceImpl::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(subs),
            Arc::new(MockNotificationRepository::new()),
        );

        let err = service.unsubscribe(1, 2).await.unwrap_err();
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
    }
}
