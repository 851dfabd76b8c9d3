//! Streaming AES-256-CTR core shared by the gateway and the decrypt CLI.
//!
//! This crate is intentionally free of AWS and HTTP dependencies. It provides
//! three layers, leaf first:
//!
//! - [`keys`] — fresh random key/IV provisioning and strict hex parsing.
//! - [`engine`] — the AES-256-CTR keystream transform bound to one key/IV pair.
//! - [`pipeline`] — source → cipher → sink pumping with deterministic
//!   completion and no whole-file buffering.
//!
//! # Symmetry
//!
//! CTR mode XORs data with a keystream, so encryption and decryption are the
//! identical operation given matching key and IV. Ciphertext length always
//! equals plaintext length; there is no padding and no authentication tag.

pub mod engine;
pub mod keys;
pub mod pipeline;

pub use engine::{CipherEngine, CipherError};
pub use keys::{generate, parse_hex, CipherKey, Iv, KeyFormatError, RandomSourceError};
pub use keys::{IV_LEN, KEY_LEN};
pub use pipeline::{transform_file, TransformError};
