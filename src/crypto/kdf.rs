use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{KEY_LEN, SALT_LEN};
use crate::error::Error;

/// Default PBKDF2 iteration count.
///
/// Deliberately higher than the historical 100k floor; offline brute force
/// against the derived key should stay expensive on current hardware.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Work factor for PBKDF2-HMAC-SHA256.
///
/// The container stores no KDF parameters, so the iteration count used to
/// encrypt must be supplied again to decrypt.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    pub fn new(iterations: u32) -> Result<Self, Error> {
        let params = Self { iterations };
        params.validate()?;
        Ok(params)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.iterations < 1 {
            return Err(Error::Params("iteration count must be >= 1".into()));
        }
        Ok(())
    }
}

/// Derives a 32-byte key from a password and salt.
///
/// Deterministic: the same (password, salt, iterations) always yields the
/// same key. An empty password is allowed; strength policy belongs to the
/// caller.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN], kdf: KdfParams) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, kdf.iterations, &mut *key);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KdfParams {
        KdfParams::new(1000).unwrap()
    }

    #[test]
    fn kdf_is_deterministic() {
        let salt = [42u8; SALT_LEN];

        let k1 = derive_key("password", &salt, fast());
        let k2 = derive_key("password", &salt, fast());

        assert_eq!(*k1, *k2);
    }

    #[test]
    fn kdf_password_affects_output() {
        let salt = [7u8; SALT_LEN];

        let k1 = derive_key("pw1", &salt, fast());
        let k2 = derive_key("pw2", &salt, fast());

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn kdf_salt_affects_output() {
        let k1 = derive_key("pw", &[1u8; SALT_LEN], fast());
        let k2 = derive_key("pw", &[2u8; SALT_LEN], fast());

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn kdf_iterations_affect_output() {
        let salt = [7u8; SALT_LEN];

        let k1 = derive_key("pw", &salt, KdfParams::new(1000).unwrap());
        let k2 = derive_key("pw", &salt, KdfParams::new(2000).unwrap());

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn kdf_empty_password_is_permitted() {
        let salt = [3u8; SALT_LEN];
        let k = derive_key("", &salt, fast());
        assert_eq!(k.len(), KEY_LEN);
    }

    #[test]
    fn kdf_invalid_params_fail_gracefully() {
        assert!(KdfParams::new(0).is_err());
    }
}
