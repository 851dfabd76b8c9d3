//! AES-256-CTR keystream transform.
//!
//! The keystream is AES-256 applied to a 128-bit big-endian counter whose
//! initial block is the IV, byte-compatible with OpenSSL's `aes-256-ctr`.
//! Output depends only on key, IV, and byte offset, so chunk boundaries never
//! affect the result.

use aes::cipher::{KeyIvInit, StreamCipher};
use thiserror::Error;

use crate::keys::{CipherKey, Iv};

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The CTR counter would wrap; continuing would reuse keystream.
    #[error("keystream exhausted")]
    KeystreamExhausted,
}

/// Streaming AES-256-CTR transform bound to one key/IV pair.
///
/// The keystream position advances with every [`apply`](Self::apply) call.
/// Encryption and decryption construct the engine identically; applying it to
/// ciphertext with the matching key/IV yields the original plaintext.
pub struct CipherEngine {
    inner: Aes256Ctr,
}

impl CipherEngine {
    /// Build an engine with the keystream positioned at offset zero.
    pub fn new(key: &CipherKey, iv: &Iv) -> Self {
        Self {
            inner: Aes256Ctr::new(key.as_bytes().into(), iv.as_bytes().into()),
        }
    }

    /// XOR the next keystream bytes into `buf` in place.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::KeystreamExhausted`] if the 128-bit counter
    /// would wrap. Unreachable for any realistic input, but propagated rather
    /// than panicked on.
    pub fn apply(&mut self, buf: &mut [u8]) -> Result<(), CipherError> {
        self.inner
            .try_apply_keystream(buf)
            .map_err(|_| CipherError::KeystreamExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate, parse_hex, IV_LEN, KEY_LEN};
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    fn zero_pair() -> (CipherKey, Iv) {
        parse_hex(&"00".repeat(KEY_LEN), &"00".repeat(IV_LEN)).unwrap()
    }

    // First keystream block for the all-zero key and counter is
    // AES-256(0^32, 0^16) = dc95c078a2408989ad48a21492842087.
    #[test]
    fn known_answer_hello_zero_key_zero_iv() {
        let (key, iv) = zero_pair();
        let mut engine = CipherEngine::new(&key, &iv);
        let mut buf = *b"hello";
        engine.apply(&mut buf).unwrap();
        assert_eq!(hex::encode(buf), "b4f0ac14cd");

        // Same operation reverses it.
        let mut engine = CipherEngine::new(&key, &iv);
        engine.apply(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn round_trip_preserves_length_and_bytes() {
        let (key, iv) = generate().unwrap();
        let plaintext: Vec<u8> = (0..=255u8).cycle().take(3 * 1024 + 7).collect();

        let mut buf = plaintext.clone();
        let mut enc = CipherEngine::new(&key, &iv);
        enc.apply(&mut buf).unwrap();
        assert_eq!(buf.len(), plaintext.len());
        assert_ne!(buf, plaintext);

        let mut dec = CipherEngine::new(&key, &iv);
        dec.apply(&mut buf).unwrap();
        assert_eq!(buf, plaintext);
    }

    #[test]
    fn chunked_apply_matches_single_apply_10mb() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut data = vec![0u8; 10 * 1024 * 1024];
        rng.fill_bytes(&mut data);
        let (key, iv) = generate().unwrap();

        let mut whole = data.clone();
        let mut engine = CipherEngine::new(&key, &iv);
        engine.apply(&mut whole).unwrap();

        let mut chunked = data;
        let mut engine = CipherEngine::new(&key, &iv);
        for chunk in chunked.chunks_mut(16) {
            engine.apply(chunk).unwrap();
        }

        assert_eq!(whole, chunked);
    }

    #[test]
    fn distinct_ivs_produce_distinct_ciphertext() {
        let (key, iv_a) = generate().unwrap();
        let (_, iv_b) = generate().unwrap();

        let mut a = [0u8; 64];
        CipherEngine::new(&key, &iv_a).apply(&mut a).unwrap();
        let mut b = [0u8; 64];
        CipherEngine::new(&key, &iv_b).apply(&mut b).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn empty_buffer_is_a_noop() {
        let (key, iv) = generate().unwrap();
        let mut engine = CipherEngine::new(&key, &iv);
        let mut buf: [u8; 0] = [];
        engine.apply(&mut buf).unwrap();
    }
}
