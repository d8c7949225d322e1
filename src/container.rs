//! The encrypted container codec.
//!
//! Container layout:
//! ```text
//! SALT (16) | NONCE (12) | CIPHERTEXT (same length as plaintext) | TAG (16)
//! ```
//!
//! All fields are fixed-size byte blobs except the ciphertext; no lengths are
//! encoded because the cipher accepts arbitrary split points. The smallest
//! valid container is 44 bytes (empty plaintext).

use std::io::{self, Read, Write};

use crate::crypto::{
    GcmOpen, GcmSeal, KdfParams, NONCE_LEN, OpenCipher, SALT_LEN, SealCipher, TAG_LEN, derive_key,
    generate_nonce, generate_salt,
};
use crate::error::Error;

/// Bytes processed per read.
pub const CHUNK_LEN: usize = 4096;
/// Salt plus nonce, always at the start of a container.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;
/// Header plus trailing tag; a container can never be shorter.
pub const MIN_CONTAINER_LEN: usize = HEADER_LEN + TAG_LEN;

/// Encrypts `source` into a container written to `sink`.
///
/// Runs in constant memory: one chunk is read, encrypted in place, and
/// written before the next is read. On error the sink may hold a partial
/// container, which no decrypt will accept as valid.
pub fn encrypt(
    password: &str,
    kdf: KdfParams,
    source: &mut impl Read,
    sink: &mut impl Write,
) -> Result<(), Error> {
    encrypt_with::<GcmSeal>(password, kdf, source, sink)
}

/// Decrypts a container from `source`, writing the plaintext to `sink`.
///
/// Candidate plaintext is streamed to the sink *before* the tag can be
/// verified; verification only completes once the whole container has been
/// consumed. Until this function returns `Ok`, nothing written to the sink
/// may be trusted, and on `Err(Error::Authentication)` the caller must
/// discard it. [`crate::decrypt_file`] does so by never materializing the
/// output path on failure.
pub fn decrypt(
    password: &str,
    kdf: KdfParams,
    source: &mut impl Read,
    sink: &mut impl Write,
) -> Result<(), Error> {
    decrypt_with::<GcmOpen>(password, kdf, source, sink)
}

pub(crate) fn encrypt_with<C: SealCipher>(
    password: &str,
    kdf: KdfParams,
    source: &mut impl Read,
    sink: &mut impl Write,
) -> Result<(), Error> {
    kdf.validate()?;

    let salt = generate_salt()?;
    let nonce = generate_nonce()?;
    let key = derive_key(password, &salt, kdf);

    sink.write_all(&salt)?;
    sink.write_all(&nonce)?;

    let mut cipher = C::init(&key, &nonce);
    let mut buf = [0u8; CHUNK_LEN];
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        cipher.update(&mut buf[..n]);
        sink.write_all(&buf[..n])?;
    }

    sink.write_all(&cipher.finalize())?;
    Ok(())
}

pub(crate) fn decrypt_with<C: OpenCipher>(
    password: &str,
    kdf: KdfParams,
    source: &mut impl Read,
    sink: &mut impl Write,
) -> Result<(), Error> {
    kdf.validate()?;

    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    read_exact_or_format(source, &mut salt)?;
    read_exact_or_format(source, &mut nonce)?;

    // `buf` keeps a 16-byte holdback ahead of each chunk: the final 16 bytes
    // of the source are the expected tag and must never reach the cipher.
    // Probing them up front also rejects anything under 44 bytes before any
    // key derivation happens.
    let mut buf = [0u8; TAG_LEN + CHUNK_LEN];
    read_exact_or_format(source, &mut buf[..TAG_LEN])?;

    let key = derive_key(password, &salt, kdf);
    let mut cipher = C::init(&key, &nonce);

    loop {
        let n = source.read(&mut buf[TAG_LEN..])?;
        if n == 0 {
            break;
        }
        // The first n bytes are now known to be ciphertext body; the next 16
        // become the new holdback.
        cipher.update(&mut buf[..n]);
        sink.write_all(&buf[..n])?;
        buf.copy_within(n..n + TAG_LEN, 0);
    }

    let mut expected = [0u8; TAG_LEN];
    expected.copy_from_slice(&buf[..TAG_LEN]);

    if cipher.finalize(&expected) {
        Ok(())
    } else {
        Err(Error::Authentication)
    }
}

fn read_exact_or_format(source: &mut impl Read, buf: &mut [u8]) -> Result<(), Error> {
    source.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::Format
        } else {
            Error::Io(e)
        }
    })
}
