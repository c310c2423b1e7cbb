// src/models/jwt.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub role: String,
    pub iat: i64, // issued at
    pub nbf: i64, // not before
    pub exp: i64, // expiration time
}

/// Minimal claims set of a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String, // user id
    pub jti: String, // unique per mint, for revocation bookkeeping
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted refresh token and what a caller needs to persist it.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub token: String,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_token_id: Uuid,
    pub refresh_expires_at: DateTime<Utc>,
}

impl AccessClaims {
    pub fn new(
        user_id: Uuid,
        role: impl Into<String>,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let issued_at = now.timestamp();

        Self {
            user_id,
            role: role.into(),
            iat: issued_at,
            nbf: issued_at,
            exp: expires_at.timestamp(),
        }
    }
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, jti: Uuid, now: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id.to_string(),
            jti: jti.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
