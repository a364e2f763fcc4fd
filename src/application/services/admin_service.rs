//! Admin Service
//!
//! Account listing and role assignment.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Role, UserRepository, UserWithRole};
use crate::shared::error::AppError;

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserWithRole>, AdminError>;

    async fn update_role(&self, user_id: i64, role_id: i32) -> Result<Role, AdminError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Unknown role")]
    UnknownRole,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<AdminError> for AppError {
    fn from(e: AdminError) -> Self {
        match e {
            AdminError::UnknownRole => AppError::BadRequest(e.to_string()),
            AdminError::UserNotFound => AppError::NotFound(e.to_string()),
            AdminError::Store(inner) => inner,
        }
    }
}

pub struct AdminServiceImpl<U>
where
    U: UserRepository,
{
    users: Arc<U>,
}

impl<U> AdminServiceImpl<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> AdminService for AdminServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn list_users(&self) -> Result<Vec<UserWithRole>, AdminError> {
        Ok(self.users.list_with_roles().await?)
    }

    async fn update_role(&self, user_id: i64, role_id: i32) -> Result<Role, AdminError> {
        let role = Role::from_id(role_id).ok_or(AdminError::UnknownRole)?;
        if !self.users.update_role(user_id, role.id()).await? {
            return Err(AdminError::UserNotFound);
        }
        tracing::info!(user_id, role = %role, "Role updated");
        Ok(role)
    }
}
