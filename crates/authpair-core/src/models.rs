//! Domain models for users and refresh tokens
//!
//! - User: account with credentials, owned by the credential store
//! - UserPublic: the only user view that leaves the server
//! - RefreshTokenRecord: a server-side record of an issued refresh token

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical form of an email address: trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User account model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,

    /// Email address (unique, normalized)
    pub email: String,

    /// Hashed password (Argon2id PHC string), never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Display name
    pub name: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Convert user to public representation (without the password hash)
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Public user representation (safe for API responses)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Input for creating a user; the store assigns id and timestamps
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

impl NewUser {
    /// Build a new user, normalizing the email
    pub fn new(email: &str, password_hash: String, name: impl Into<String>) -> Self {
        Self {
            email: normalize_email(email),
            password_hash,
            name: name.into(),
        }
    }

    /// Materialize into a stored user with a fresh id
    pub fn into_user(self) -> User {
        User {
            id: Uuid::new_v4(),
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            created_at: Utc::now(),
        }
    }
}

/// Server-side record of an issued refresh token
///
/// The token string is the key; a record that is expired or deleted is never
/// accepted for renewal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    /// Opaque signed token string (unique)
    pub token: String,

    /// Owning user
    pub user_id: Uuid,

    /// Record expiration time
    pub expires_at: DateTime<Utc>,

    /// Record creation time
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(token: impl Into<String>, user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            user_id,
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// Check expiry against a given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Check if the record is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
