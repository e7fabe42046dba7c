//! Account registration and login.

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use tracing::instrument;

use golazo_core::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse};

use crate::error::Result;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// `POST /api/auth/register`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let Json(request) = payload?;
    let user = AuthService::new(state.store(), state.tokens())
        .register(&request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// `POST /api/auth/login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(request) = payload?;
    let response = AuthService::new(state.store(), state.tokens())
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(response))
}
