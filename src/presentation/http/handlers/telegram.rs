//! Telegram Code Exchange Handler

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::dto::request::VerifyCodeQuery;
use crate::application::dto::response::TelegramLoginResponse;
use crate::application::services::{TelegramAuthService, TelegramAuthServiceImpl};
use crate::infrastructure::repositories::{PgAuthCodeRepository, PgUserRepository};
use crate::presentation::http::extractors::ApiQuery;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// `GET /api/verify-tg-code?code=`
pub async fn verify_code(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VerifyCodeQuery>,
) -> Result<Json<TelegramLoginResponse>, AppError> {
    let service = TelegramAuthServiceImpl::new(
        Arc::new(PgAuthCodeRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.telegram.clone(),
        state.tokens.clone(),
        state.settings.telegram.code_ttl_minutes,
    );

    let login = service.verify(query.code.as_deref()).await?;
    Ok(Json(login.into()))
}
