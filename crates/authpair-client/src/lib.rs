//! authpair client - token-managing HTTP client
//!
//! Keeps the access token in memory and the refresh token in durable
//! storage. Requests that come back 401 get exactly one refresh-and-retry.
//!
//! Author: hephaex@gmail.com

pub mod client;
pub mod error;
pub mod manager;
pub mod storage;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{AuthClient, AuthSession, UserProfile};
pub use error::{ClientError, Result};
pub use manager::TokenManager;
pub use storage::{
    AccessTokenCell, FileRefreshTokenStore, MemoryRefreshTokenStore, RefreshTokenStore,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
