//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::{AuthService, TokenService};
use authpair_core::{AppConfig, CredentialStore};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Credential store
    pub store: Arc<dyn CredentialStore>,
    /// Token signing and verification
    pub tokens: Arc<TokenService>,
    /// Authentication service
    pub auth: AuthService,
}

impl AppState {
    /// Create application state over an already-connected store
    pub fn new(config: AppConfig, store: Arc<dyn CredentialStore>) -> Self {
        let tokens = Arc::new(TokenService::new(&config.auth));
        let auth = AuthService::new(store.clone(), tokens.clone());

        Self {
            config,
            start_time: Instant::now(),
            store,
            tokens,
            auth,
        }
    }

    /// Replace the auth service (e.g. to tune the password work factor)
    pub fn with_auth_service(mut self, auth: AuthService) -> Self {
        self.auth = auth;
        self
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
