//! JWT token generation and validation
//!
//! Implements JWT-based authentication with HMAC-SHA256 signing.
//! Access and refresh tokens share the claim layout and the signing secret;
//! they differ in lifetime and in the `token_type` claim.

use authpair_core::{AuthConfig, MAX_TOKEN_TTL_SECS};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Which half of the pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT Claims structure
///
/// `sub` and `email` round-trip exactly through sign and verify.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - user ID
    pub sub: String,
    /// JWT ID - unique per issued token
    pub jti: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// User's email address
    pub email: String,
    /// Access or refresh
    pub token_type: TokenType,
}

impl Claims {
    /// Parse the subject as a user id
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Expected {expected:?} token")]
    WrongTokenType { expected: TokenType },

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

/// Signs and verifies access and refresh tokens
///
/// Owns the signing secret for the lifetime of the process.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl TokenService {
    /// Create a token service from auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        // Expired means expired; no clock-skew grace
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl_secs: config.access_ttl_secs.min(MAX_TOKEN_TTL_SECS),
            refresh_ttl_secs: config.refresh_ttl_secs.min(MAX_TOKEN_TTL_SECS),
        }
    }

    /// Access token lifetime in seconds
    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_ttl_secs
    }

    /// Issue a short-lived access token
    ///
    /// # Example
    ///
    /// ```no_run
    /// use authpair_api::auth::jwt::TokenService;
    /// use authpair_core::{AuthConfig, MAX_TOKEN_TTL_SECS};
    /// use uuid::Uuid;
    ///
    /// let tokens = TokenService::new(&AuthConfig::default());
    /// let token = tokens
    ///     .issue_access_token(Uuid::new_v4(), "john@example.com")
    ///     .expect("Failed to issue token");
    /// ```
    pub fn issue_access_token(&self, subject: Uuid, email: &str) -> Result<String, JwtError> {
        self.sign(subject, email, TokenType::Access)
    }

    /// Issue a long-lived refresh token
    pub fn issue_refresh_token(&self, subject: Uuid, email: &str) -> Result<String, JwtError> {
        self.sign(subject, email, TokenType::Refresh)
    }

    /// Validate a token's signature, issuer and expiry, returning its claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken,
            },
        )?;

        Ok(token_data.claims)
    }

    /// `verify`, additionally requiring the given token type
    pub fn verify_as(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType { expected });
        }
        Ok(claims)
    }

    fn sign(&self, subject: Uuid, email: &str, token_type: TokenType) -> Result<String, JwtError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let ttl_secs = match token_type {
            TokenType::Access => self.access_ttl_secs,
            TokenType::Refresh => self.refresh_ttl_secs,
        };

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
            email: email.to_string(),
            token_type,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }
}
