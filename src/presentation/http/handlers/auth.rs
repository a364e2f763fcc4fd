//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::{LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::application::dto::response::{LoginResponse, RegisterResponse, TokenResponse};
use crate::application::services::{AuthService, AuthServiceImpl};
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::http::extractors::ValidatedJson;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn auth_service(state: &AppState) -> AuthServiceImpl<PgUserRepository> {
    AuthServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.tokens.clone(),
    )
}

/// Register a new password account
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = auth_service(&state)
        .register(body.username.trim(), body.phone.trim(), &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered".into(),
            user,
        }),
    ))
}

/// Login with phone and password
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (user, tokens) = auth_service(&state)
        .login(body.phone.trim(), &body.password)
        .await?;

    Ok(Json(LoginResponse {
        tokens: TokenResponse::from(tokens),
        user_id: user.id,
    }))
}

/// Exchange a refresh token for a new token pair
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let tokens = auth_service(&state)
        .refresh(body.refresh_token.as_deref())
        .await?;

    Ok(Json(TokenResponse::from(tokens)))
}
