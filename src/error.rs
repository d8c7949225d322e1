use std::io;
use thiserror::Error;

/// Terminal failures of one encrypt or decrypt call.
///
/// Nothing is retried internally; a call either fully succeeds or surfaces
/// exactly one of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),

    #[error("OS random generator unavailable")]
    Random,

    #[error("invalid container: file too short")]
    Format,

    /// Tag mismatch at finalization. Covers both a wrong password and a
    /// tampered container; the two are indistinguishable on purpose and the
    /// message must never hint at which one it was.
    #[error("decryption failed")]
    Authentication,

    #[error("invalid KDF parameters: {0}")]
    Params(String),
}
