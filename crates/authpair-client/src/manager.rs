//! Token manager: bearer attachment plus single refresh-and-retry

use crate::error::{ClientError, Result};
use crate::storage::{AccessTokenCell, RefreshTokenStore};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use serde_json::{json, Value};
use std::sync::Arc;

pub const REFRESH_PATH: &str = "/auth/refresh";

/// Wraps a `Transport` with token bookkeeping
pub struct TokenManager {
    transport: Arc<dyn Transport>,
    access: AccessTokenCell,
    refresh: Arc<dyn RefreshTokenStore>,
}

impl TokenManager {
    pub fn new(transport: Arc<dyn Transport>, refresh: Arc<dyn RefreshTokenStore>) -> Self {
        Self {
            transport,
            access: AccessTokenCell::new(),
            refresh,
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access.get().await
    }

    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.refresh.load().await
    }

    /// Store a freshly issued token pair
    pub async fn store_pair(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.refresh.save(refresh_token).await?;
        self.access.set(access_token).await;
        Ok(())
    }

    /// Drop both tokens
    pub async fn clear(&self) -> Result<()> {
        self.access.clear().await;
        self.refresh.clear().await
    }

    /// Send without attaching credentials or retrying
    pub async fn send_public(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.transport.send(request).await
    }

    /// Send with the current access token
    ///
    /// A 401 on a request that has not been retried triggers one refresh and
    /// one replay. The replayed response is returned as-is, even if it is
    /// another 401.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        if let Some(token) = self.access.get().await {
            request.set_bearer(&token);
        }

        let response = self.transport.send(&request).await?;
        if !response.is_unauthorized() || request.retried {
            return Ok(response);
        }

        request.retried = true;
        let token = self.renew_access_token().await?;
        request.set_bearer(&token);

        self.transport.send(&request).await
    }

    /// Exchange the stored refresh token for a new access token
    ///
    /// Any failure clears both tokens and yields `ReauthenticationRequired`.
    pub async fn renew_access_token(&self) -> Result<String> {
        let Some(refresh_token) = self.refresh.load().await? else {
            tracing::debug!("No refresh token stored");
            self.clear_after_failure().await;
            return Err(ClientError::ReauthenticationRequired);
        };

        // Straight to the transport so a 401 here can never recurse
        let request = ApiRequest::post(REFRESH_PATH, json!({ "refresh_token": refresh_token }));
        let access_token = match self.transport.send(&request).await {
            Ok(response) if response.is_success() => response
                .body
                .get("access_token")
                .and_then(Value::as_str)
                .map(str::to_owned),
            Ok(response) => {
                tracing::warn!(status = response.status, "Refresh rejected");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh request failed");
                None
            }
        };

        match access_token {
            Some(token) => {
                self.access.set(token.clone()).await;
                Ok(token)
            }
            None => {
                self.clear_after_failure().await;
                Err(ClientError::ReauthenticationRequired)
            }
        }
    }

    async fn clear_after_failure(&self) {
        if let Err(e) = self.clear().await {
            tracing::warn!(error = %e, "Failed to clear stored tokens");
        }
    }
}
