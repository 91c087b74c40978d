//! Authentication service layer
//!
//! Provides business logic for user registration, login, token refresh, and logout.
//! Persistence goes through the injected `CredentialStore`; signing goes through
//! the shared `TokenService`.

use super::jwt::{TokenService, TokenType};
use super::password::{hash_password_with_config, verify_password, PasswordConfig};
use crate::error::AppError;
use authpair_core::{CredentialStore, NewUser, RefreshTokenRecord, UserPublic};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Refresh request; a missing token is rejected as unauthorized, not malformed
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Logout request; a missing token is accepted and does nothing
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Authentication response with a fresh token pair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

/// Refresh response; the refresh token itself is not rotated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Public user information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<UserPublic> for UserInfo {
    fn from(user: UserPublic) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    password: PasswordConfig,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(store: Arc<dyn CredentialStore>, tokens: Arc<TokenService>) -> Self {
        Self {
            store,
            tokens,
            password: PasswordConfig::default(),
        }
    }

    /// Override the password hashing work factor
    pub fn with_password_config(mut self, password: PasswordConfig) -> Self {
        self.password = password;
        self
    }

    /// Shared token service
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Register a new user and sign them in
    ///
    /// # Returns
    ///
    /// * `Ok(AuthResponse)` - Token pair and public user view
    /// * `Err(AppError::Conflict)` - If the email is already registered
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        if self.store.find_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.hash(request.password).await?;

        // The store is the final arbiter of uniqueness under concurrent registration
        let user = self
            .store
            .insert_user(NewUser::new(&request.email, password_hash, request.name))
            .await
            .map_err(|e| match e {
                authpair_core::CoreError::Conflict(_) => {
                    AppError::Conflict("User already exists".to_string())
                }
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, "User registered");

        self.issue_pair(user.to_public()).await
    }

    /// Check an email/password pair against the stored hash
    ///
    /// Returns `Ok(None)` when the user is unknown or the password does not match.
    pub async fn validate_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserPublic>, AppError> {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            return Ok(None);
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {e}")))?
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {e}")))?;

        Ok(valid.then(|| user.to_public()))
    }

    /// Issue a token pair for an already-authenticated user
    ///
    /// Prior refresh tokens for the same user stay valid; concurrent sessions are allowed.
    pub async fn login(&self, user: &UserPublic) -> Result<AuthResponse, AppError> {
        let response = self.issue_pair(user.clone()).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(response)
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The token must be present in the store, unexpired there, and carry a
    /// valid unexpired signature. Every failure is `Unauthorized`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AppError> {
        let invalid = || AppError::unauthorized("Invalid refresh token");

        let record = self
            .store
            .find_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Refresh rejected: token not in store");
                invalid()
            })?;

        if record.is_expired() {
            tracing::warn!(user_id = %record.user_id, "Refresh rejected: stored token expired");
            return Err(invalid());
        }

        let claims = self
            .tokens
            .verify_as(refresh_token, TokenType::Refresh)
            .map_err(|e| {
                tracing::warn!(user_id = %record.user_id, error = %e, "Refresh rejected: verification failed");
                invalid()
            })?;

        if claims.sub != record.user_id.to_string() {
            tracing::warn!(user_id = %record.user_id, "Refresh rejected: subject mismatch");
            return Err(invalid());
        }

        let user = self
            .store
            .find_user_by_id(record.user_id)
            .await?
            .ok_or_else(invalid)?;

        let access_token = self
            .tokens
            .issue_access_token(user.id, &user.email)
            .map_err(|e| AppError::Internal(format!("Failed to issue access token: {e}")))?;

        tracing::debug!(user_id = %user.id, "Access token refreshed");

        Ok(RefreshResponse { access_token })
    }

    /// Revoke a refresh token; unknown tokens are not an error
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        let removed = self.store.delete_refresh_token(refresh_token).await?;
        tracing::debug!(removed, "Refresh token revoked");
        Ok(())
    }

    /// Public profile of a user
    pub async fn profile(&self, user_id: Uuid) -> Result<UserPublic, AppError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .map(|user| user.to_public())
            .ok_or_else(|| AppError::unauthorized("User not found"))
    }

    /// Delete refresh-token records whose expiry has passed
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let purged = self.store.delete_expired_refresh_tokens(Utc::now()).await?;
        if purged > 0 {
            tracing::info!(purged, "Purged expired refresh tokens");
        }
        Ok(purged)
    }

    async fn issue_pair(&self, user: UserPublic) -> Result<AuthResponse, AppError> {
        let access_token = self
            .tokens
            .issue_access_token(user.id, &user.email)
            .map_err(|e| AppError::Internal(format!("Failed to issue access token: {e}")))?;
        let refresh_token = self
            .tokens
            .issue_refresh_token(user.id, &user.email)
            .map_err(|e| AppError::Internal(format!("Failed to issue refresh token: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(self.tokens.refresh_ttl_secs() as i64);
        self.store
            .insert_refresh_token(RefreshTokenRecord::new(
                refresh_token.clone(),
                user.id,
                expires_at,
            ))
            .await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }

    async fn hash(&self, password: String) -> Result<String, AppError> {
        let config = self.password.clone();
        tokio::task::spawn_blocking(move || hash_password_with_config(&password, &config))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
    }
}
