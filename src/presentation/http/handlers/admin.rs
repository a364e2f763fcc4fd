//! Admin Handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::dto::request::UpdateRoleRequest;
use crate::application::dto::response::RoleUpdatedResponse;
use crate::application::services::{AdminService, AdminServiceImpl};
use crate::domain::UserWithRole;
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::http::extractors::ValidatedJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn admin_service(state: &AppState) -> AdminServiceImpl<PgUserRepository> {
    AdminServiceImpl::new(Arc::new(PgUserRepository::new(state.db.clone())))
}

/// `GET /api/admin/users`
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserWithRole>>, AppError> {
    Ok(Json(admin_service(&state).list_users().await?))
}

/// `POST /api/admin/update-role`
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<RoleUpdatedResponse>, AppError> {
    let role = admin_service(&state)
        .update_role(body.user_id, body.role_id)
        .await?;
    tracing::info!(admin_id = auth.user_id, user_id = body.user_id, "Role changed by admin");
    Ok(Json(RoleUpdatedResponse::new(body.user_id, role)))
}
