//! Common error types shared across crates.

use thiserror::Error;

/// Top-level gateway error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`GatewayError::Unauthorized`] → 403
/// - [`GatewayError::BadRequest`] → 400
/// - [`GatewayError::NotFound`] → 404
/// - [`GatewayError::UpstreamTimeout`] → 504
/// - [`GatewayError::Upstream`] → 502
/// - [`GatewayError::Internal`] → 500
///
/// The [`Display`](std::fmt::Display) form carries internal detail and is for
/// logs only; [`GatewayError::public_message`] is what goes over the wire.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The bearer token is missing or does not match the configured secret.
    #[error("forbidden")]
    Unauthorized,

    /// The request was malformed — missing multipart field, bad filename, or
    /// an incomplete key/iv pair.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested object does not exist in the store.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The object store did not answer within the operation deadline.
    #[error("object store timed out: {0}")]
    UpstreamTimeout(String),

    /// The object store rejected or failed the request.
    #[error("object store error: {0}")]
    Upstream(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::Unauthorized => 403,
            GatewayError::BadRequest(_) => 400,
            GatewayError::NotFound(_) => 404,
            GatewayError::UpstreamTimeout(_) => 504,
            GatewayError::Upstream(_) => 502,
            GatewayError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for the error response body.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Unauthorized => "forbidden",
            GatewayError::BadRequest(_) => "bad_request",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::UpstreamTimeout(_) => "upstream_timeout",
            GatewayError::Upstream(_) => "upstream_error",
            GatewayError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to expose to callers.
    ///
    /// Storage and internal variants collapse to a generic description so
    /// upstream detail (bucket names, SDK messages) never leaves the process.
    pub fn public_message(&self) -> &str {
        match self {
            GatewayError::Unauthorized => "Forbidden",
            GatewayError::BadRequest(msg) => msg,
            GatewayError::NotFound(_) => "file not found",
            GatewayError::UpstreamTimeout(_) => "object store timed out",
            GatewayError::Upstream(_) => "object store request failed",
            GatewayError::Internal(_) => "internal error",
        }
    }
}
