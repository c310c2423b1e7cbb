use rand::RngCore;
use rand::rngs::OsRng;

/// Cryptographically secure bytes for nonces and token ids.
///
/// Production code always uses [`OsRandom`]; the trait exists so tests can
/// substitute a deterministic source.
pub trait RandomSource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}
