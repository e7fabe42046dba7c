//! Bearer-token extractors.
//!
//! Tokens are read from `Authorization: Bearer <token>` and verified with the
//! keys held in [`AppState`].

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use golazo_core::{Role, UserId};

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::Claims;
use crate::state::AppState;

/// The caller identified by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Extractor that requires a valid bearer token.
///
/// Responds 401 when the header is missing or the token does not verify.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;
        Ok(Self(authenticate(state, token)?))
    }
}

/// Extractor that reads a bearer token when one is sent.
///
/// A request without `Authorization` yields `None`; a token that is sent but
/// does not verify is still rejected with 401.
pub struct OptionalAuth(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(Self(Some(authenticate(state, token)?))),
            None => Ok(Self(None)),
        }
    }
}

/// The token from an `Authorization: Bearer` header, if the header is present.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| AppError::Unauthorized("Malformed authorization header".to_string()))
}

fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let user = AuthUser::try_from(state.tokens().verify(token)?)?;
    set_sentry_user(&user.id, Some(&user.email));
    Ok(user)
}
