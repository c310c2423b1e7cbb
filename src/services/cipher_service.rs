// src/services/cipher_service.rs
use std::fmt;
use std::string::FromUtf8Error;
use std::sync::Arc;

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CipherConfig;
use crate::utils::random::{OsRandom, RandomSource};

/// AES-256 key length in bytes.
pub const KEY_SIZE: usize = 32;
/// AES-GCM nonce length in bytes.
pub const NONCE_SIZE: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption key must be 64 hex characters (32 bytes)")]
    InvalidKey,
    #[error("nonce must be {expected} bytes, got {actual}")]
    InvalidNonce { expected: usize, actual: usize },
    #[error("encryption failed")]
    EncryptionFailed,
    /// Wrong key, tampered ciphertext and mismatched nonce all end up here.
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Ciphertext (with its authentication tag) and the nonce it was sealed under.
/// Both must be stored to decrypt later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
}

/// Authenticated encryption of payloads at rest under one fixed key.
///
/// Every call to [`Encryptor::encrypt`] draws a fresh random nonce; the encryptor keeps
/// no other state between calls.
pub struct Encryptor {
    cipher: Aes256Gcm,
    random: Arc<dyn RandomSource>,
}

impl fmt::Debug for Encryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encryptor").finish_non_exhaustive()
    }
}

impl Encryptor {
    pub fn new(hex_key: &str) -> Result<Self, CipherError> {
        Self::with_random(hex_key, Arc::new(OsRandom))
    }

    pub fn from_config(config: &CipherConfig) -> Result<Self, CipherError> {
        Self::new(&config.hex_key)
    }

    pub fn with_random(hex_key: &str, random: Arc<dyn RandomSource>) -> Result<Self, CipherError> {
        let key = hex::decode(hex_key.trim()).map_err(|_| CipherError::InvalidKey)?;
        if key.len() != KEY_SIZE {
            return Err(CipherError::InvalidKey);
        }
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CipherError::InvalidKey)?;

        Ok(Self { cipher, random })
    }

    /// A new random key, hex-encoded, for provisioning `ENCRYPTION_KEY`.
    pub fn generate_key_hex() -> String {
        let mut key = [0u8; KEY_SIZE];
        OsRandom.fill_bytes(&mut key);
        hex::encode(key)
    }

    pub fn required_nonce_size(&self) -> usize {
        NONCE_SIZE
    }

    #[instrument(skip_all, fields(len = plaintext.len()))]
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, CipherError> {
        let mut nonce = [0u8; NONCE_SIZE];
        self.random.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(GenericArray::from_slice(&nonce), plaintext)
            .map_err(|_| CipherError::EncryptionFailed)?;

        Ok(Envelope {
            ciphertext,
            nonce: nonce.to_vec(),
        })
    }

    #[instrument(skip_all, fields(len = ciphertext.len()))]
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, CipherError> {
        if nonce.len() != NONCE_SIZE {
            return Err(CipherError::InvalidNonce {
                expected: NONCE_SIZE,
                actual: nonce.len(),
            });
        }

        self.cipher
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|_| {
                debug!("authenticated decryption failed");
                CipherError::DecryptionFailed
            })
    }

    pub fn encrypt_string(&self, plaintext: &str) -> Result<Envelope, CipherError> {
        self.encrypt(plaintext.as_bytes())
    }

    pub fn decrypt_string(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<String, CipherError> {
        let plaintext = self.decrypt(ciphertext, nonce)?;
        Ok(String::from_utf8(plaintext)?)
    }

    pub fn decrypt_envelope(&self, envelope: &Envelope) -> Result<Vec<u8>, CipherError> {
        self.decrypt(&envelope.ciphertext, &envelope.nonce)
    }
}
