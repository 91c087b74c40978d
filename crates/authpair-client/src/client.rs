//! High-level auth client

use crate::error::Result;
use crate::manager::TokenManager;
use crate::storage::RefreshTokenStore;
use crate::transport::{ApiRequest, HttpTransport, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Public user view returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Token pair plus user, as returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

/// Client for the authpair API
///
/// ```rust,no_run
/// use authpair_client::{AuthClient, MemoryRefreshTokenStore};
/// use std::sync::Arc;
///
/// # async fn run() -> authpair_client::Result<()> {
/// let client = AuthClient::new("http://localhost:3001", Arc::new(MemoryRefreshTokenStore::new()))?;
/// client.login("a@x.com", "secret1").await?;
/// let me = client.profile().await?;
/// println!("{}", me.email);
/// # Ok(())
/// # }
/// ```
pub struct AuthClient {
    manager: TokenManager,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, refresh_store: Arc<dyn RefreshTokenStore>) -> Result<Self> {
        let transport = HttpTransport::new(base_url)?;
        Ok(Self::with_transport(Arc::new(transport), refresh_store))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, refresh_store: Arc<dyn RefreshTokenStore>) -> Self {
        Self {
            manager: TokenManager::new(transport, refresh_store),
        }
    }

    pub fn manager(&self) -> &TokenManager {
        &self.manager
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<AuthSession> {
        let request = ApiRequest::post(
            "/auth/register",
            json!({ "email": email, "password": password, "name": name }),
        );
        self.start_session(request).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let request = ApiRequest::post("/auth/login", json!({ "email": email, "password": password }));
        self.start_session(request).await
    }

    async fn start_session(&self, request: ApiRequest) -> Result<AuthSession> {
        let session: AuthSession = self.manager.send_public(&request).await?.into_result()?;
        self.manager
            .store_pair(&session.access_token, &session.refresh_token)
            .await?;

        tracing::info!(user_id = %session.user.id, "Session started");
        Ok(session)
    }

    /// Revoke the refresh token server-side (best effort) and clear local tokens
    pub async fn logout(&self) -> Result<()> {
        if let Some(refresh_token) = self.manager.refresh_token().await? {
            let request = ApiRequest::post("/auth/logout", json!({ "refresh_token": refresh_token }));
            match self.manager.send_public(&request).await {
                Ok(response) if !response.is_success() => {
                    tracing::warn!(status = response.status, "Logout request rejected");
                }
                Err(e) => tracing::warn!(error = %e, "Logout request failed"),
                Ok(_) => {}
            }
        }

        self.manager.clear().await
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.manager
            .execute(ApiRequest::get("/auth/profile"))
            .await?
            .into_result()
    }

    /// Force a refresh, returning the new access token
    pub async fn refresh_token(&self) -> Result<String> {
        self.manager.renew_access_token().await
    }

    /// True when a refresh token is stored
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.manager.refresh_token().await?.is_some())
    }
}
