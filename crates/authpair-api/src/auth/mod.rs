//! Authentication module
//!
//! JWT-based authentication with the following components:
//! - Token service: signing and verification of access/refresh tokens
//! - Password hashing with Argon2
//! - Middleware for bearer-token route protection
//! - Authentication service orchestrating register/login/refresh/logout/profile

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, JwtError, TokenService, TokenType};
pub use middleware::{auth_middleware, AuthError, AuthenticatedUser};
pub use password::{hash_password, verify_password, PasswordConfig, PasswordError};
pub use service::{
    AuthResponse, AuthService, LoginRequest, LogoutRequest, RefreshRequest, RefreshResponse,
    RegisterRequest, UserInfo,
};
