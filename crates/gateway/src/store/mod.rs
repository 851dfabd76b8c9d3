//! Object store abstraction and the S3-backed implementation.
//!
//! Handlers only see the [`ObjectStore`] trait; tests swap in mock or
//! in-memory stores without touching AWS.

pub mod s3;

pub use s3::S3Store;

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use common::GatewayError;
use thiserror::Error;

/// Errors produced by the object store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object exists under the requested key.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The store did not answer within the operation deadline.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected or failed the request.
    #[error("store call failed: {0}")]
    Upstream(String),
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => GatewayError::NotFound(key),
            StoreError::Timeout(d) => GatewayError::UpstreamTimeout(format!("after {d:?}")),
            StoreError::Upstream(msg) => GatewayError::Upstream(msg),
        }
    }
}

/// Key-addressed blob storage.
///
/// `put` replaces any previous object under the key and is atomic from the
/// caller's perspective. `get` distinguishes a missing key from other
/// failures so the HTTP layer can answer 404 instead of 502.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`.
    async fn put(&self, key: &str, body: ByteStream) -> Result<(), StoreError>;

    /// Fetch the object stored under `key`.
    async fn get(&self, key: &str) -> Result<ByteStream, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_gateway_statuses() {
        let e: GatewayError = StoreError::NotFound("report.pdf.enc".into()).into();
        assert_eq!(e.http_status(), 404);

        let e: GatewayError = StoreError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(e.http_status(), 504);

        let e: GatewayError = StoreError::Upstream("connection refused".into()).into();
        assert_eq!(e.http_status(), 502);
    }

    #[test]
    fn not_found_names_the_key() {
        let e = StoreError::NotFound("missing.enc".into());
        assert!(e.to_string().contains("missing.enc"));
    }
}
