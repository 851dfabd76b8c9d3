//! S3-backed [`ObjectStore`] with per-call deadlines.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use super::{ObjectStore, StoreError};
use crate::config::Config;

/// S3 implementation of [`ObjectStore`].
///
/// Bodies are streamed in both directions; nothing is buffered whole in
/// memory. Every call is bounded by the configured operation deadline so a
/// hung upstream surfaces as [`StoreError::Timeout`] rather than a stalled
/// request.
#[derive(Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    op_timeout: Duration,
}

impl S3Store {
    /// Build the S3 client from the ambient AWS environment.
    ///
    /// Credentials and region are resolved via the standard AWS chain. When
    /// `cfg.s3_endpoint` is set (MinIO, LocalStack) the endpoint is
    /// overridden and path-style addressing is forced, since
    /// virtual-hosted-style URLs do not resolve against local stores.
    pub async fn init(cfg: &Config) -> Self {
        let aws_cfg = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&aws_cfg);
        if let Some(endpoint) = &cfg.s3_endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: cfg.aws_bucket.clone(),
            op_timeout: Duration::from_secs(cfg.store_timeout_secs),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, body: ByteStream) -> Result<(), StoreError> {
        let send = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send();

        tokio::time::timeout(self.op_timeout, send)
            .await
            .map_err(|_| StoreError::Timeout(self.op_timeout))?
            .map_err(|e| StoreError::Upstream(format!("put {key}: {e}")))?;

        debug!(key, bucket = %self.bucket, "object stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<ByteStream, StoreError> {
        let send = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send();

        let resp = tokio::time::timeout(self.op_timeout, send)
            .await
            .map_err(|_| StoreError::Timeout(self.op_timeout))?;

        match resp {
            Ok(out) => {
                debug!(key, bucket = %self.bucket, "object fetched");
                Ok(out.body)
            }
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    Err(StoreError::NotFound(key.to_owned()))
                } else {
                    Err(StoreError::Upstream(format!("get {key}: {e}")))
                }
            }
        }
    }
}
