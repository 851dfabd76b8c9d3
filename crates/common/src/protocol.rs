//! Request and response types exchanged with gateway clients.
//!
//! These types are serialised as JSON on the public HTTP API. The upload
//! response is the only place key material ever appears — the gateway hands
//! the hex pair to the caller and keeps nothing.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Upload endpoint
// ---------------------------------------------------------------------------

/// Successful response body for `POST /upload`.
///
/// `key` and `iv` are lowercase hex (64 and 32 chars). They are generated
/// fresh for this one file and never persisted server-side; losing them makes
/// the stored ciphertext permanently unrecoverable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Human-readable confirmation, e.g. `"File uploaded securely"`.
    pub message: String,
    /// Hex-encoded 256-bit encryption key.
    pub key: String,
    /// Hex-encoded 128-bit initialisation vector.
    pub iv: String,
    /// Object key the ciphertext was stored under (original name + `.enc`).
    pub filename: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status, always `"ok"` while the process is serving.
    pub status: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
    /// Current wall-clock time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_round_trip() {
        let resp = UploadResponse {
            message: "File uploaded securely".into(),
            key: "ab".repeat(32),
            iv: "cd".repeat(16),
            filename: "report.pdf.enc".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        let decoded: UploadResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.key.len(), 64);
        assert_eq!(decoded.iv.len(), 32);
        assert_eq!(decoded.filename, "report.pdf.enc");
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("bad_request", "missing file field");
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("missing file field"));
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            uptime_secs: 42,
            timestamp_ms: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.uptime_secs, 42);
        assert_eq!(decoded.status, "ok");
    }
}
