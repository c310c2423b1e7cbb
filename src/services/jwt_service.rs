// src/services/jwt_service.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
    errors::Error as JwtError,
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::{Builder, Uuid};

use crate::config::TokenConfig;
use crate::models::jwt::{AccessClaims, RefreshClaims, RefreshToken, TokenPair};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::random::{OsRandom, RandomSource};

/// The only header algorithms a token may declare. Anything else is rejected
/// before the signature is looked at.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, wrongly signed, wrong algorithm, wrong claim shape or bad subject.
    #[error("invalid token")]
    InvalidToken,
    /// Well formed and correctly signed, but past its expiry.
    #[error("token has expired")]
    ExpiredToken,
    #[error("cannot issue a token for the nil user id")]
    NilIdentity,
    /// The configured lifetime pushes the expiry outside the representable time range.
    #[error("token lifetime {0} overflows the expiry timestamp")]
    TtlOverflow(Duration),
    #[error("failed to sign token: {0}")]
    Signing(#[source] JwtError),
}

/// Mints and validates access and refresh tokens.
///
/// Each token class has its own secret and lifetime. The manager is immutable after
/// construction, so a single instance can be shared across threads.
#[derive(Clone)]
pub struct TokenManager {
    access_enc_key: EncodingKey,
    access_dec_key: DecodingKey,
    refresh_enc_key: EncodingKey,
    refresh_dec_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl TokenManager {
    pub fn new(config: TokenConfig) -> Self {
        Self::with_sources(config, Arc::new(SystemClock), Arc::new(OsRandom))
    }

    pub fn with_sources(
        config: TokenConfig,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let access_secret = config.access_secret.as_bytes();
        let refresh_secret = config.refresh_secret.as_bytes();

        // Time checks run against our own clock after the signature is verified.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            access_enc_key: EncodingKey::from_secret(access_secret),
            access_dec_key: DecodingKey::from_secret(access_secret),
            refresh_enc_key: EncodingKey::from_secret(refresh_secret),
            refresh_dec_key: DecodingKey::from_secret(refresh_secret),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            validation,
            clock,
            random,
        }
    }

    /* ---------- PUBLIC API ---------- */

    #[instrument(skip(self))]
    pub fn issue_access_token(&self, user_id: Uuid, role: &str) -> Result<String, TokenError> {
        if user_id.is_nil() {
            return Err(TokenError::NilIdentity);
        }

        let now = self.clock.now();
        let expires_at = expiry(now, self.access_ttl)?;
        let claims = AccessClaims::new(user_id, role, now, expires_at);
        self.create_jwt(&claims, &self.access_enc_key)
    }

    /// Mint a refresh token with a fresh token id. The id and expiry are returned
    /// so the caller can record them and size the cookie.
    #[instrument(skip(self))]
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<RefreshToken, TokenError> {
        if user_id.is_nil() {
            return Err(TokenError::NilIdentity);
        }

        let token_id = self.new_token_id();
        let now = self.clock.now();
        let expires_at = expiry(now, self.refresh_ttl)?;
        let claims = RefreshClaims::new(user_id, token_id, now, expires_at);
        let token = self.create_jwt(&claims, &self.refresh_enc_key)?;
        // Report the expiry at the token's own one-second precision.
        let expires_at = claims.expires_at().unwrap_or(expires_at);

        Ok(RefreshToken {
            token,
            token_id,
            expires_at,
        })
    }

    /// Access and refresh token for a login.
    pub fn issue_token_pair(&self, user_id: Uuid, role: &str) -> Result<TokenPair, TokenError> {
        let access_token = self.issue_access_token(user_id, role)?;
        let refresh = self.issue_refresh_token(user_id)?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.token,
            refresh_token_id: refresh.token_id,
            refresh_expires_at: refresh.expires_at,
        })
    }

    #[instrument(skip_all)]
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims = self.decode_jwt::<AccessClaims>(token, &self.access_dec_key)?;

        if claims.user_id.is_nil() {
            debug!("access token carries the nil user id");
            return Err(TokenError::InvalidToken);
        }
        self.check_time_window(Some(claims.nbf), claims.exp)?;

        Ok(claims)
    }

    /// Full refresh claims, for callers that track token ids.
    #[instrument(skip_all)]
    pub fn validate_refresh_claims(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.decode_refresh(token).map(|(claims, _)| claims)
    }

    #[instrument(skip_all)]
    pub fn validate_refresh_token(&self, token: &str) -> Result<Uuid, TokenError> {
        self.decode_refresh(token).map(|(_, user_id)| user_id)
    }

    pub fn refresh_token_lifetime(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn access_token_lifetime(&self) -> Duration {
        self.access_ttl
    }

    /* ---------- PRIVATE HELPERS ---------- */

    fn create_jwt<T: Serialize>(&self, claims: &T, key: &EncodingKey) -> Result<String, TokenError> {
        encode(&Header::default(), claims, key).map_err(TokenError::Signing)
    }

    fn decode_jwt<T: DeserializeOwned>(&self, token: &str, key: &DecodingKey) -> Result<T, TokenError> {
        let header = decode_header(token).map_err(reject)?;
        if !HMAC_ALGORITHMS.contains(&header.alg) {
            debug!(alg = ?header.alg, "token declares a non-HMAC algorithm");
            return Err(TokenError::InvalidToken);
        }

        decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(reject)
    }

    /// Claim shape (subject and token id) is settled before the clock is consulted,
    /// so `ExpiredToken` only ever describes an otherwise well-formed token.
    fn decode_refresh(&self, token: &str) -> Result<(RefreshClaims, Uuid), TokenError> {
        let claims = self.decode_jwt::<RefreshClaims>(token, &self.refresh_dec_key)?;

        let user_id = match Uuid::parse_str(&claims.sub) {
            Ok(user_id) if !user_id.is_nil() => user_id,
            _ => {
                debug!("refresh token subject is not a valid user id");
                return Err(TokenError::InvalidToken);
            }
        };
        if Uuid::parse_str(&claims.jti).is_err() {
            debug!("refresh token id is not a valid identifier");
            return Err(TokenError::InvalidToken);
        }
        self.check_time_window(None, claims.exp)?;

        Ok((claims, user_id))
    }

    fn check_time_window(&self, not_before: Option<i64>, expires_at: i64) -> Result<(), TokenError> {
        let now = self.clock.now().timestamp();

        if not_before.is_some_and(|nbf| now < nbf) {
            debug!("token is not valid yet");
            return Err(TokenError::InvalidToken);
        }
        if now > expires_at {
            debug!(expired_at = ?DateTime::<Utc>::from_timestamp(expires_at, 0), "token has expired");
            return Err(TokenError::ExpiredToken);
        }

        Ok(())
    }

    fn new_token_id(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.random.fill_bytes(&mut bytes);
        Builder::from_random_bytes(bytes).into_uuid()
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, TokenError> {
    now.checked_add_signed(ttl).ok_or(TokenError::TtlOverflow(ttl))
}

// Expiry is never decided here: library time checks are off, see `check_time_window`.
fn reject(err: JwtError) -> TokenError {
    debug!(error = %err, "token rejected");
    TokenError::InvalidToken
}
