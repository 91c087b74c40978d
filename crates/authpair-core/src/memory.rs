//! In-memory credential store
//!
//! Suitable for development and tests. State lives for the lifetime of the
//! process and is shared through the `Arc` handed to the services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{normalize_email, NewUser, RefreshTokenRecord, User};
use crate::store::CredentialStore;
use crate::{CoreError, Result};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    /// normalized email -> user id
    emails: HashMap<String, Uuid>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

/// Credential store backed by process memory
#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refresh-token records currently held
    pub async fn refresh_token_count(&self) -> usize {
        self.inner.read().await.refresh_tokens.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut inner = self.inner.write().await;
        let email = normalize_email(&user.email);

        if inner.emails.contains_key(&email) {
            return Err(CoreError::Conflict(format!("email {email} already registered")));
        }

        let user = NewUser { email, ..user }.into_user();
        inner.emails.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .emails
            .get(&normalize_email(email))
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn insert_refresh_token(&self, record: RefreshTokenRecord) -> Result<()> {
        let mut inner = self.inner.write().await;

        if inner.refresh_tokens.contains_key(&record.token) {
            return Err(CoreError::Conflict("refresh token already stored".to_string()));
        }
        if !inner.users.contains_key(&record.user_id) {
            return Err(CoreError::NotFound(format!("user {}", record.user_id)));
        }

        inner.refresh_tokens.insert(record.token.clone(), record);
        Ok(())
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self.inner.read().await.refresh_tokens.get(token).cloned())
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<u64> {
        let removed = self.inner.write().await.refresh_tokens.remove(token);
        Ok(u64::from(removed.is_some()))
    }

    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.refresh_tokens.len();
        inner.refresh_tokens.retain(|_, record| !record.is_expired_at(now));
        Ok((before - inner.refresh_tokens.len()) as u64)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
