//! Credential store abstraction
//!
//! The store exclusively owns user and refresh-token records. Uniqueness of
//! emails and token strings is enforced here, not by callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::memory::InMemoryCredentialStore;
use crate::models::{NewUser, RefreshTokenRecord, User};
use crate::postgres::PgCredentialStore;
use crate::Result;

/// Persistence operations for users and refresh tokens
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user if the email is not taken.
    ///
    /// Fails with `CoreError::Conflict` when the normalized email already exists.
    async fn insert_user(&self, user: NewUser) -> Result<User>;

    /// Find a user by email (normalized before lookup)
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a user by id
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Persist an issued refresh token.
    ///
    /// Fails with `CoreError::Conflict` if the token string is already stored.
    async fn insert_refresh_token(&self, record: RefreshTokenRecord) -> Result<()>;

    /// Look up a refresh token record by its token string
    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Delete every record matching the token string, returning how many were removed
    async fn delete_refresh_token(&self, token: &str) -> Result<u64>;

    /// Delete records whose expiry is before `now`
    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Check that the backing storage is reachable
    async fn health_check(&self) -> Result<()>;
}

/// Build the configured credential store
pub async fn connect_store(config: &DatabaseConfig) -> Result<Arc<dyn CredentialStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory credential store");
            Ok(Arc::new(InMemoryCredentialStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PgCredentialStore::connect(&config.postgres_url, config.pool_size).await?;
            store.migrate().await?;
            tracing::info!("Using PostgreSQL credential store");
            Ok(Arc::new(store))
        }
    }
}
