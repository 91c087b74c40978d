//! Authentication API handlers
//!
//! Thin request/response mapping over `AuthService`.
//!
//! Author: hephaex@gmail.com

use crate::auth::{
    AuthResponse, AuthenticatedUser, LoginRequest, LogoutRequest, RefreshRequest,
    RefreshResponse, RegisterRequest, UserInfo,
};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Logout response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

/// Register a new user account
///
/// Creates the user and returns a fresh access/refresh token pair.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 409, description = "Email already registered", body = crate::error::ApiError),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    request.validate()?;
    let response = state.auth.register(request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let user = state
        .auth
        .validate_user(&request.email, &request.password)
        .await?
        .ok_or_else(|| {
            tracing::debug!("Login rejected: invalid credentials");
            AppError::unauthorized("Invalid credentials")
        })?;

    let response = state.auth.login(&user).await?;

    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Access token issued", body = RefreshResponse),
        (status = 401, description = "Invalid or expired refresh token", body = crate::error::ApiError),
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // A missing, empty or unreadable token is just an invalid token
    let refresh_token = payload
        .ok()
        .and_then(|Json(request)| request.refresh_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;
    let response = state.auth.refresh(&refresh_token).await?;

    Ok(Json(response))
}

/// Revoke a refresh token
///
/// Always succeeds; unknown or missing tokens and absent bodies are ignored.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logout successful", body = LogoutResponse),
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    if let Some(token) = request.refresh_token.as_deref() {
        state.auth.logout(token).await?;
    }

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "auth",
    responses(
        (status = 200, description = "Current user profile", body = UserInfo),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.auth.profile(user.user_id).await?;

    Ok(Json(UserInfo::from(profile)))
}
