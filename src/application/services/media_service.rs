//! Media Service
//!
//! Avatar and post cover uploads.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{PostRepository, UserRepository};
use crate::infrastructure::storage::{public_path, LocalStorage, UploadKind, UploadedFile};
use crate::shared::error::AppError;

#[async_trait]
pub trait MediaService: Send + Sync {
    /// Store a new avatar and return its public path. The previous avatar
    /// file is removed.
    async fn upload_avatar(&self, user_id: i64, file: UploadedFile) -> Result<String, MediaError>;

    async fn delete_avatar(&self, user_id: i64) -> Result<(), MediaError>;

    async fn upload_cover(&self, file: UploadedFile) -> Result<String, MediaError>;

    /// Delete a cover file and clear every post using it.
    async fn delete_cover(&self, file_name: &str) -> Result<u64, MediaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("User not found")]
    UserNotFound,

    #[error("No avatar to delete")]
    NoAvatar,

    #[error("File not found")]
    FileNotFound,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::UserNotFound | MediaError::FileNotFound => AppError::NotFound(e.to_string()),
            MediaError::NoAvatar => AppError::BadRequest(e.to_string()),
            MediaError::Store(inner) => inner,
        }
    }
}

pub struct MediaServiceImpl<U, P>
where
    U: UserRepository,
    P: PostRepository,
{
    users: Arc<U>,
    posts: Arc<P>,
    storage: LocalStorage,
}

impl<U, P> MediaServiceImpl<U, P>
where
    U: UserRepository,
    P: PostRepository,
{
    pub fn new(users: Arc<U>, posts: Arc<P>, storage: LocalStorage) -> Self {
        Self {
            users,
            posts,
            storage,
        }
    }
}

#[async_trait]
impl<U, P> MediaService for MediaServiceImpl<U, P>
where
    U: UserRepository + 'static,
    P: PostRepository + 'static,
{
    async fn upload_avatar(&self, user_id: i64, file: UploadedFile) -> Result<String, MediaError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MediaError::UserNotFound)?;

        let path = self.storage.store(UploadKind::Avatar, &file).await?;
        if let Err(e) = self.users.set_avatar(user_id, Some(path.clone())).await {
            self.storage.discard(Some(&path)).await;
            return Err(e.into());
        }

        self.storage.discard(user.avatar.as_deref()).await;
        Ok(path)
    }

    async fn delete_avatar(&self, user_id: i64) -> Result<(), MediaError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MediaError::UserNotFound)?;
        let avatar = user.avatar.ok_or(MediaError::NoAvatar)?;

        self.users.set_avatar(user_id, None).await?;
        self.storage.discard(Some(&avatar)).await;
        Ok(())
    }

    async fn upload_cover(&self, file: UploadedFile) -> Result<String, MediaError> {
        Ok(self.storage.store(UploadKind::Cover, &file).await?)
    }

    async fn delete_cover(&self, file_name: &str) -> Result<u64, MediaError> {
        if !self.storage.remove_file(UploadKind::Cover, file_name).await? {
            return Err(MediaError::FileNotFound);
        }
        let cleared = self
            .posts
            .clear_cover(&public_path(UploadKind::Cover, file_name))
            .await?;
        tracing::debug!(file = file_name, cleared, "Cover deleted");
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadSettings;
    use crate::domain::{MockPostRepository, MockUserRepository, User};
    use axum::http::StatusCode;
    use chrono::Utc;
    use std::path::PathBuf;

    fn temp_storage() -> (LocalStorage, PathBuf) {
        let root = std::env::temp_dir().join(format!("starsclub-media-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(&UploadSettings {
            dir: root.to_string_lossy().into_owned(),
            max_file_size: 1024,
        });
        (storage, root)
    }

    fn jpeg() -> UploadedFile {
        UploadedFile {
            content_type: "image/jpeg".into(),
            data: vec![0xFF, 0xD8, 0xFF],
        }
    }

    fn user_with_avatar(avatar: Option<String>) -> User {
        User {
            id: 1,
            username: "frank".into(),
            phone: None,
            password_hash: None,
            telegram_id: None,
            role_id: 2,
            avatar,
            about: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn replacing_avatar_removes_old_file() {
        let (storage, root) = temp_storage();
        let old = storage.store(UploadKind::Avatar, &jpeg()).await.unwrap();
        let old_file = root.join(old.trim_start_matches("/uploads/"));
        assert!(old_file.exists());

        let mut users = MockUserRepository::new();
        let stored = old.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user_with_avatar(Some(stored.clone())))));
        users.expect_set_avatar().returning(|_, _| Ok(()));

        let service = MediaServiceImpl::new(Arc::new(users), Arc::new(MockPostRepository::new()), storage);
        let new_path = service.upload_avatar(1, jpeg()).await.unwrap();

        assert_ne!(new_path, old);
        assert!(!old_file.exists());
        assert!(root.join(new_path.trim_start_matches("/uploads/")).exists());
        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn rejects_non_image_upload() {
        let (storage, _) = temp_storage();
        let service = MediaServiceImpl::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockPostRepository::new()),
            storage,
        );

        let err = service
            .upload_cover(UploadedFile {
                content_type: "application/pdf".into(),
                data: vec![1, 2, 3],
            })
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deleting_cover_clears_post_references() {
        let (storage, root) = temp_storage();
        let path = storage.store(UploadKind::Cover, &jpeg()).await.unwrap();
        let file_name = path.rsplit('/').next().unwrap().to_string();

        let mut posts = MockPostRepository::new();
        let expected = path.clone();
        posts
            .expect_clear_cover()
            .withf(move |cover| cover.to_string() == expected)
            .returning(|_| Ok(2));

        let service = MediaServiceImpl::new(Arc::new(MockUserRepository::new()), Arc::new(posts), storage);
        assert_eq!(service.delete_cover(&file_name).await.unwrap(), 2);
        assert!(matches!(
            service.delete_cover(&file_name).await,
            Err(MediaError::FileNotFound)
        ));
        assert!(matches!(
            service.delete_cover("../secret.png").await,
            Err(MediaError::Store(AppError::BadRequest(_)))
        ));
        let _ = tokio::fs::remove_dir_all(root).await;
    }
}
