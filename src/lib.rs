//! Password-based authenticated file encryption.
//!
//! A file is encrypted into a single self-contained container:
//!
//! ```text
//! SALT (16) | NONCE (12) | CIPHERTEXT | TAG (16)
//! ```
//!
//! The key is derived from the password with PBKDF2-HMAC-SHA256 and a fresh
//! random salt, the contents are streamed through AES-256-GCM in fixed-size
//! chunks, and the authentication tag over the whole ciphertext closes the
//! file. Decryption with the wrong password and decryption of a tampered
//! container fail the same way; the two causes are indistinguishable by
//! design.

pub mod container;
mod crypto;
mod error;
mod output;

pub use crate::container::{CHUNK_LEN, HEADER_LEN, MIN_CONTAINER_LEN};
pub use crate::crypto::{KdfParams, NONCE_LEN, SALT_LEN, TAG_LEN};
pub use crate::error::Error;

use std::fs::File;
use std::path::Path;

use crate::output::PendingFile;

/// Encrypts `input` into a container at `output`.
///
/// The container is written to a temporary file and renamed into place only
/// once complete, so an interrupted run never leaves a truncated container at
/// `output`. An existing file at `output` is replaced.
pub fn encrypt_file(
    password: &str,
    kdf: KdfParams,
    input: &Path,
    output: &Path,
) -> Result<(), Error> {
    let mut source = File::open(input)?;
    let mut sink = PendingFile::create(output)?;

    container::encrypt(password, kdf, &mut source, &mut sink)?;

    sink.commit()?;
    Ok(())
}

/// Decrypts the container at `input`, writing the plaintext to `output`.
///
/// Plaintext only appears at `output` after the authentication tag has
/// verified; on any failure the pending output is discarded and `output` is
/// left untouched. `kdf` must carry the same iteration count the container
/// was encrypted with.
pub fn decrypt_file(
    password: &str,
    kdf: KdfParams,
    input: &Path,
    output: &Path,
) -> Result<(), Error> {
    let mut source = File::open(input)?;
    let mut sink = PendingFile::create(output)?;

    container::decrypt(password, kdf, &mut source, &mut sink)?;

    sink.commit()?;
    Ok(())
}
