//! Common types, protocol definitions, and errors shared across `vaultgate` crates.

pub mod error;
pub mod protocol;

pub use error::GatewayError;

/// Suffix appended to object keys and staging files holding ciphertext.
///
/// The decrypt CLI strips this suffix to derive its default output path.
pub const ENCRYPTED_SUFFIX: &str = ".enc";
