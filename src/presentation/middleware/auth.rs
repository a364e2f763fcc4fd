//! Authentication Middleware
//!
//! Bearer token validation for protected routes and the role gate for
//! admin routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::application::services::{TokenError, TokenKind, TokenService};
use crate::domain::Role;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated caller, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
    pub role_id: i32,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))
    }
}

/// Authentication middleware that validates access tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let user = authenticate(&state.tokens, token)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Reject callers whose role claim is not admin. Must run after
/// [`auth_middleware`].
pub async fn admin_only(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    if !Role::is_allowed(user.role_id, &[Role::Admin]) {
        tracing::debug!(user_id = user.user_id, role_id = user.role_id, "Admin route refused");
        return Err(AppError::Forbidden("Insufficient permissions".into()));
    }

    Ok(next.run(request).await)
}

fn authenticate(tokens: &TokenService, token: &str) -> Result<AuthUser, AppError> {
    let claims = tokens.decode(token, TokenKind::Access).map_err(|e| match e {
        TokenError::Expired => AppError::Unauthorized("Token expired".into()),
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    let user_id = claims
        .user_id()
        .map_err(|_| AppError::Unauthorized("Invalid token claims".into()))?;

    Ok(AuthUser {
        user_id,
        role_id: claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::token_service::test_settings;
    use crate::domain::User;
    use chrono::Utc;

    fn user(role_id: i32) -> User {
        User {
            id: 12,
            username: "gail".into(),
            phone: None,
            password_hash: None,
            telegram_id: None,
            role_id,
            avatar: None,
            about: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_authenticates() {
        let tokens = TokenService::new(test_settings());
        let pair = tokens.issue_pair(&user(1)).unwrap();

        let caller = authenticate(&tokens, &pair.access_token).unwrap();
        assert_eq!(caller.user_id, 12);
        assert_eq!(caller.role_id, 1);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let tokens = TokenService::new(test_settings());
        let pair = tokens.issue_pair(&user(2)).unwrap();

        assert!(matches!(
            authenticate(&tokens, &pair.refresh_token),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            authenticate(&tokens, "garbage"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
