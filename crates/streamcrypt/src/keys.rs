//! Key and IV provisioning: fresh random material for encryption, strict hex
//! parsing for decryption.
//!
//! # Security invariants
//!
//! - The key/IV pair is generated fresh per file and handed to the caller
//!   exactly once; nothing in this system persists it.
//! - An IV is never reused under the same key — CTR keystream reuse leaks the
//!   XOR of the two plaintexts.
//! - Key material is never logged or printed; [`CipherKey`] redacts its Debug
//!   output and zeroes its buffer on drop.

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of a CTR-mode initialisation vector (16 bytes = one AES block).
pub const IV_LEN: usize = 16;

/// Errors produced when parsing externally supplied key material.
#[derive(Debug, Error)]
pub enum KeyFormatError {
    /// The decoded key is the wrong length.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    KeyLength(usize),

    /// The decoded IV is the wrong length.
    #[error("invalid iv length: expected {IV_LEN} bytes, got {0}")]
    IvLength(usize),

    /// The key string is not valid hex.
    #[error("key is not valid hex")]
    KeyEncoding,

    /// The IV string is not valid hex.
    #[error("iv is not valid hex")]
    IvEncoding,
}

/// The OS entropy source failed to produce random bytes.
///
/// Platform-fatal: callers report this rather than retry.
#[derive(Debug, Error)]
#[error("entropy source unavailable: {0}")]
pub struct RandomSourceError(#[from] rand::Error);

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// Returned to the caller as hex exactly once, then dropped. When this type
/// is dropped, the memory is overwritten with zeroes to minimise the window
/// during which key material lives in RAM.
#[derive(Clone)]
pub struct CipherKey(Box<[u8; KEY_LEN]>);

impl CipherKey {
    /// Wrap exactly [`KEY_LEN`] raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyFormatError::KeyLength`] if the slice has the wrong length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyFormatError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyFormatError::KeyLength(bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Decode a hex string into a key. Exact length required; nothing is
    /// padded or truncated.
    ///
    /// # Errors
    ///
    /// Returns [`KeyFormatError::KeyEncoding`] for non-hex input and
    /// [`KeyFormatError::KeyLength`] for a decoded length other than
    /// [`KEY_LEN`].
    pub fn from_hex(s: &str) -> Result<Self, KeyFormatError> {
        let bytes = hex::decode(s).map_err(|_| KeyFormatError::KeyEncoding)?;
        Self::from_bytes(&bytes)
    }

    /// Lowercase hex encoding of the key material (64 chars).
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0[..])
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for CipherKey {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("CipherKey([REDACTED])")
    }
}

/// Initialisation vector: the initial CTR counter block.
///
/// Not secret on its own (useless without the key), but paired 1:1 with a
/// [`CipherKey`] and generated fresh per file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iv([u8; IV_LEN]);

impl Iv {
    /// Wrap exactly [`IV_LEN`] raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyFormatError::IvLength`] if the slice has the wrong length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyFormatError> {
        if bytes.len() != IV_LEN {
            return Err(KeyFormatError::IvLength(bytes.len()));
        }
        let mut buf = [0u8; IV_LEN];
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Decode a hex string into an IV. Exact length required.
    ///
    /// # Errors
    ///
    /// Returns [`KeyFormatError::IvEncoding`] for non-hex input and
    /// [`KeyFormatError::IvLength`] for a decoded length other than
    /// [`IV_LEN`].
    pub fn from_hex(s: &str) -> Result<Self, KeyFormatError> {
        let bytes = hex::decode(s).map_err(|_| KeyFormatError::IvEncoding)?;
        Self::from_bytes(&bytes)
    }

    /// Lowercase hex encoding of the IV (32 chars).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw IV bytes.
    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }
}

/// Generate a fresh random key/IV pair from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`RandomSourceError`] only if the entropy source is unavailable.
pub fn generate() -> Result<(CipherKey, Iv), RandomSourceError> {
    let mut key = Box::new([0u8; KEY_LEN]);
    OsRng.try_fill_bytes(&mut key[..])?;
    let mut iv = [0u8; IV_LEN];
    OsRng.try_fill_bytes(&mut iv)?;
    Ok((CipherKey(key), Iv(iv)))
}

/// Decode an externally supplied hex key/IV pair for decryption.
///
/// # Errors
///
/// Returns [`KeyFormatError`] when either string has the wrong length,
/// charset, or encoding. Nothing is inferred or padded.
pub fn parse_hex(key_hex: &str, iv_hex: &str) -> Result<(CipherKey, Iv), KeyFormatError> {
    let key = CipherKey::from_hex(key_hex)?;
    let iv = Iv::from_hex(iv_hex)?;
    Ok((key, iv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generate_produces_exact_lengths() {
        let (key, iv) = generate().unwrap();
        assert_eq!(key.as_bytes().len(), KEY_LEN);
        assert_eq!(iv.as_bytes().len(), IV_LEN);
        assert_eq!(key.to_hex().len(), KEY_LEN * 2);
        assert_eq!(iv.to_hex().len(), IV_LEN * 2);
    }

    #[test]
    fn generate_unique_across_trials() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let (key, iv) = generate().unwrap();
            let mut pair = key.as_bytes().to_vec();
            pair.extend_from_slice(iv.as_bytes());
            assert!(seen.insert(pair), "duplicate key/iv pair generated");
        }
    }

    #[test]
    fn parse_hex_round_trip() {
        let (key, iv) = generate().unwrap();
        let (parsed_key, parsed_iv) = parse_hex(&key.to_hex(), &iv.to_hex()).unwrap();
        assert_eq!(parsed_key.as_bytes(), key.as_bytes());
        assert_eq!(parsed_iv, iv);
    }

    #[test]
    fn parse_rejects_empty() {
        let iv_hex = "00".repeat(IV_LEN);
        assert!(matches!(
            parse_hex("", &iv_hex),
            Err(KeyFormatError::KeyLength(0))
        ));
        let key_hex = "00".repeat(KEY_LEN);
        assert!(matches!(
            parse_hex(&key_hex, ""),
            Err(KeyFormatError::IvLength(0))
        ));
    }

    #[test]
    fn parse_rejects_short_key() {
        let short = "ab".repeat(KEY_LEN - 1);
        let iv_hex = "00".repeat(IV_LEN);
        assert!(matches!(
            parse_hex(&short, &iv_hex),
            Err(KeyFormatError::KeyLength(31))
        ));
    }

    #[test]
    fn parse_rejects_non_hex() {
        let bad = "zz".repeat(KEY_LEN);
        let iv_hex = "00".repeat(IV_LEN);
        assert!(matches!(
            parse_hex(&bad, &iv_hex),
            Err(KeyFormatError::KeyEncoding)
        ));
        let key_hex = "00".repeat(KEY_LEN);
        let bad_iv = "not hex at all, wrong too!".to_string();
        assert!(matches!(
            parse_hex(&key_hex, &bad_iv),
            Err(KeyFormatError::IvEncoding)
        ));
    }

    #[test]
    fn parse_rejects_wrong_iv_length() {
        let key_hex = "00".repeat(KEY_LEN);
        let long_iv = "00".repeat(IV_LEN + 1);
        assert!(matches!(
            parse_hex(&key_hex, &long_iv),
            Err(KeyFormatError::IvLength(17))
        ));
    }

    #[test]
    fn key_redacted_in_debug() {
        let (key, _) = generate().unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }

    #[test]
    fn error_messages_name_expected_lengths() {
        let e = KeyFormatError::KeyLength(7);
        assert!(e.to_string().contains("32"));
        let e = KeyFormatError::IvLength(7);
        assert!(e.to_string().contains("16"));
    }
}
