//! Password hashing with bcrypt.

use bcrypt::{BcryptError, hash, verify};
use thiserror::Error;
use tracing::instrument;

/// Work factor for every stored hash. Each step doubles the cost.
pub const HASH_COST: u32 = 12;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(#[source] BcryptError),
    #[error("failed to verify password: {0}")]
    Verify(#[source] BcryptError),
}

#[instrument(skip_all)]
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash(password, HASH_COST).map_err(PasswordError::Hash)
}

/// Returns `Ok(false)` on mismatch and an error only when `hash` is not a bcrypt hash.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(PasswordError::Verify)
}
