//! Configuration loading and validation for the gateway.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Shared bearer secret callers must present. **Required.**
    ///
    /// There is deliberately no default: an unset token must fail startup,
    /// never fall back to a known constant.
    pub auth_token: String,

    /// S3 bucket ciphertext objects are stored in.
    #[serde(default = "default_aws_bucket")]
    pub aws_bucket: String,

    /// Optional S3 endpoint override for S3-compatible stores (MinIO,
    /// LocalStack). Forces path-style addressing when set.
    #[serde(default)]
    pub s3_endpoint: Option<String>,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory transient staging files are written to.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Maximum accepted upload body size in mebibytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Deadline in seconds for each object store call.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_secs: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

const BYTES_PER_MIB: usize = 1024 * 1024;

fn default_aws_bucket() -> String {
    "secure-bucket".into()
}
fn default_port() -> u16 {
    3000
}
fn default_upload_dir() -> String {
    "uploads".into()
}
fn default_max_upload_mb() -> usize {
    1024
}
fn default_store_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.auth_token, "AUTH_TOKEN")?;
        ensure_non_empty(&self.aws_bucket, "AWS_BUCKET")?;
        ensure_non_empty(&self.upload_dir, "UPLOAD_DIR")?;
        if let Some(endpoint) = &self.s3_endpoint {
            ensure_non_empty(endpoint, "S3_ENDPOINT")?;
        }

        if self.max_upload_mb == 0 {
            anyhow::bail!("MAX_UPLOAD_MB must be > 0");
        }
        if self.max_upload_mb.checked_mul(BYTES_PER_MIB).is_none() {
            anyhow::bail!("MAX_UPLOAD_MB is too large to express as a byte count");
        }
        if self.store_timeout_secs == 0 {
            anyhow::bail!("STORE_TIMEOUT_SECS must be > 0");
        }
        Ok(())
    }

    /// Upload body cap in bytes.
    ///
    /// Saturates rather than wraps; [`validate`](Self::validate) has already
    /// rejected any value the multiply cannot represent.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(BYTES_PER_MIB)
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
