//! authpair Core - Domain models, storage traits, and shared types
//!
//! This crate defines the core abstractions shared by the server and client:
//! - User and refresh-token records
//! - The `CredentialStore` trait with in-memory and PostgreSQL variants
//! - Common error types
//! - Configuration management

pub mod config;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig, StoreBackend,
    MAX_TOKEN_TTL_SECS,
};
pub use memory::InMemoryCredentialStore;
pub use models::{normalize_email, NewUser, RefreshTokenRecord, User, UserPublic};
pub use postgres::PgCredentialStore;
pub use store::{connect_store, CredentialStore};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for credential storage and configuration
#[derive(Error, Debug)]
pub enum CoreError {
    /// A uniqueness constraint was violated (duplicate email or token)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
