//! Cryptographic primitives for the container codec.
//!
//! Provides key derivation, random parameter generation, and the streaming
//! AEAD cipher the codec runs plaintext and ciphertext through.

pub mod gcm;
pub mod kdf;

pub use gcm::{GcmOpen, GcmSeal};
pub use kdf::{KdfParams, derive_key};

use crate::error::Error;
use getrandom::fill;

/// Length of the salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the nonce (12 bytes, AES-GCM standard).
pub const NONCE_LEN: usize = 12;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the authentication tag (16 bytes / 128 bits).
pub const TAG_LEN: usize = 16;

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<(), Error> {
    fill(buf).map_err(|_| Error::Random)
}

/// Generate a fresh per-encryption salt
pub fn generate_salt() -> Result<[u8; SALT_LEN], Error> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

/// Generate a fresh per-encryption nonce
pub fn generate_nonce() -> Result<[u8; NONCE_LEN], Error> {
    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;
    Ok(nonce)
}

/// Encryption half of the streaming AEAD the codec consumes.
///
/// `update` turns plaintext into ciphertext in place; `finalize` yields the
/// tag computed over every ciphertext byte seen so far. Arbitrary chunk split
/// points are accepted.
pub trait SealCipher: Sized {
    fn init(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN]) -> Self;
    fn update(&mut self, buf: &mut [u8]);
    fn finalize(self) -> [u8; TAG_LEN];
}

/// Decryption half of the streaming AEAD the codec consumes.
///
/// `update` turns ciphertext into candidate plaintext in place; the output is
/// untrusted until `finalize` has compared the computed tag against the
/// expected one (in constant time) and returned `true`.
pub trait OpenCipher: Sized {
    fn init(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN]) -> Self;
    fn update(&mut self, buf: &mut [u8]);
    #[must_use]
    fn finalize(self, expected: &[u8; TAG_LEN]) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salts_are_unique() {
        let a = generate_salt().unwrap();
        let b = generate_salt().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn nonces_are_unique() {
        let a = generate_nonce().unwrap();
        let b = generate_nonce().unwrap();
        assert_ne!(a, b);
    }
}
