//! Axum middleware: bearer-token gate and the shared request timeout.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::ErrorResponse;
use common::GatewayError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::state::AppState;

/// Default per-request timeout applied to all routes.
///
/// Generous because a single request can stream a large file through
/// encryption and the object store.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Reject any request that does not carry `Authorization: Bearer <token>`
/// matching the configured secret.
///
/// Anything else — a missing header, a non-bearer scheme, a wrong token —
/// gets the same 403 body, so callers cannot distinguish which part failed.
pub async fn require_bearer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token_matches(token, &state.auth_token) => next.run(req).await,
        _ => {
            let err = GatewayError::Unauthorized;
            let body = ErrorResponse::new(err.code(), err.public_message());
            (StatusCode::FORBIDDEN, Json(body)).into_response()
        }
    }
}

/// Constant-time token equality.
///
/// Both values are MACed under a fresh ephemeral key before comparison, so
/// the short-circuiting `==` runs on uniformly distributed digests and leaks
/// nothing about where the underlying bytes differ.
fn token_matches(presented: &str, expected: &str) -> bool {
    type HmacSha256 = Hmac<Sha256>;

    let ephemeral: [u8; 32] = rand::random();
    let digest = |data: &[u8]| -> [u8; 32] {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&ephemeral)
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        mac.finalize().into_bytes().into()
    };

    digest(presented.as_bytes()) == digest(expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_tokens_accepted() {
        assert!(token_matches("hunter2", "hunter2"));
    }

    #[test]
    fn differing_tokens_rejected() {
        assert!(!token_matches("hunter2", "hunter3"));
        assert!(!token_matches("hunter2", "hunter22"));
        assert!(!token_matches("", "hunter2"));
    }

    #[test]
    fn empty_tokens_still_compare_equal() {
        // Config validation forbids an empty secret; the primitive itself
        // stays total.
        assert!(token_matches("", ""));
    }
}
