//! Session credentials for the auction backend.
//!
//! Two independent components live here: [`TokenManager`] mints and validates
//! access/refresh JWTs, and [`Encryptor`] seals payloads at rest with AES-256-GCM.
//! Password hashing is a stateless helper in [`utils::password`].

pub mod config;
pub mod models;
pub mod services;
pub mod utils;
#[cfg(test)]
mod tests;

pub use config::{CipherConfig, ConfigError, TokenConfig};
pub use models::jwt::{AccessClaims, RefreshClaims, RefreshToken, TokenPair};
pub use services::cipher_service::{CipherError, Encryptor, Envelope, KEY_SIZE, NONCE_SIZE};
pub use services::jwt_service::{TokenError, TokenManager};
pub use utils::clock::{Clock, FixedClock, SystemClock};
pub use utils::password::{PasswordError, hash_password, verify_password};
pub use utils::random::{OsRandom, RandomSource};
