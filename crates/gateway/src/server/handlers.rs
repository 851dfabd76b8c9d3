//! Axum request handlers for all gateway endpoints.

use std::path::{Path as FsPath, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::multipart::Field,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use common::protocol::{ErrorResponse, HealthResponse, UploadResponse};
use common::{GatewayError, ENCRYPTED_SUFFIX};
use futures::StreamExt;
use serde::Deserialize;
use streamcrypt::{generate, parse_hex, transform_file, CipherEngine, CipherKey, Iv};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::state::AppState;

/// Render a [`GatewayError`] as its JSON error response.
fn error_response(err: &GatewayError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::new(err.code(), err.public_message());
    (status, Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// `POST /upload` — encrypt a multipart file and store the ciphertext.
///
/// The `file` part is streamed to a staging file, encrypted to a `.enc`
/// sibling under a fresh key/IV, and the ciphertext is put to the object
/// store under `<original filename>.enc`. Both staging files are deleted
/// whether the request succeeds, fails, or is abandoned by the client
/// mid-transfer. The key/IV hex pair in the response is the only copy that
/// ever exists — the gateway keeps nothing.
pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    match handle_upload(&state, multipart).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => {
            match &e {
                GatewayError::BadRequest(_) => warn!(error = %e, "upload rejected"),
                _ => error!(error = %e, "upload failed"),
            }
            error_response(&e)
        }
    }
}

async fn handle_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadResponse, GatewayError> {
    let mut field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|e| GatewayError::BadRequest(format!("malformed multipart body: {e}")))?
        {
            Some(f) if f.name() == Some("file") => break f,
            Some(_) => continue,
            None => return Err(GatewayError::BadRequest("missing file field".into())),
        }
    };

    let original_name = field
        .file_name()
        .map(str::to_owned)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| GatewayError::BadRequest("file field has no filename".into()))?;
    if original_name.contains('/') || original_name.contains('\\') {
        return Err(GatewayError::BadRequest(
            "filename must not contain path separators".into(),
        ));
    }

    // Staging names are UUIDs so concurrent uploads never collide. The guard
    // removes both files on every exit from this scope, including the handler
    // future being dropped on a client disconnect.
    let staging_id = Uuid::new_v4().to_string();
    let staging = StagingGuard {
        plain: state.upload_dir.join(&staging_id),
        enc: state.upload_dir.join(format!("{staging_id}{ENCRYPTED_SUFFIX}")),
    };

    stage_encrypt_store(state, &mut field, &original_name, &staging.plain, &staging.enc).await
}

/// Stream the multipart part to disk, encrypt it, and store the ciphertext.
///
/// The caller owns staging-file cleanup regardless of outcome.
async fn stage_encrypt_store(
    state: &AppState,
    field: &mut Field<'_>,
    original_name: &str,
    staging_plain: &FsPath,
    staging_enc: &FsPath,
) -> Result<UploadResponse, GatewayError> {
    let mut dst = fs::File::create(staging_plain)
        .await
        .map_err(|e| GatewayError::Internal(format!("create staging file: {e}")))?;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| GatewayError::BadRequest(format!("upload stream failed: {e}")))?
    {
        dst.write_all(&chunk)
            .await
            .map_err(|e| GatewayError::Internal(format!("write staging file: {e}")))?;
    }
    dst.flush()
        .await
        .map_err(|e| GatewayError::Internal(format!("flush staging file: {e}")))?;
    drop(dst);

    let (key, iv) =
        generate().map_err(|e| GatewayError::Internal(format!("key generation failed: {e}")))?;
    let mut engine = CipherEngine::new(&key, &iv);
    let bytes = transform_file(staging_plain, staging_enc, &mut engine)
        .await
        .map_err(|e| GatewayError::Internal(format!("encryption failed: {e}")))?;

    let object_key = format!("{original_name}{ENCRYPTED_SUFFIX}");
    let body = ByteStream::from_path(staging_enc)
        .await
        .map_err(|e| GatewayError::Internal(format!("open ciphertext: {e}")))?;
    state.store.put(&object_key, body).await?;

    info!(object = %object_key, bytes, "file encrypted and stored");
    Ok(UploadResponse {
        message: "File uploaded securely".into(),
        key: key.to_hex(),
        iv: iv.to_hex(),
        filename: object_key,
    })
}

/// Removes the staging file pair when dropped.
///
/// Cleanup must not depend on the handler future running to completion:
/// axum drops the future when the client disconnects mid-transfer, and the
/// plaintext staging file must not outlive the request in that case either.
/// Removal failures are logged, not surfaced; a missing file is normal.
struct StagingGuard {
    plain: PathBuf,
    enc: PathBuf,
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        for path in [&self.plain, &self.enc] {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "failed to remove staging file");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// Optional decrypt parameters for `GET /download/:filename`.
#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    /// Hex key returned by the original upload.
    pub key: Option<String>,
    /// Hex IV returned by the original upload.
    pub iv: Option<String>,
}

/// `GET /download/:filename` — stream a stored object back to the caller.
///
/// With no query parameters the raw ciphertext is returned. When the caller
/// supplies both `key` and `iv`, the body is decrypted while streaming and
/// the `.enc` suffix is stripped from the attachment name. Supplying only
/// one of the two is a 400.
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(params): Query<DownloadParams>,
) -> Response {
    match handle_download(&state, &filename, params).await {
        Ok(resp) => resp,
        Err(e) => {
            match &e {
                GatewayError::NotFound(_) | GatewayError::BadRequest(_) => {
                    warn!(object = %filename, error = %e, "download rejected")
                }
                _ => error!(object = %filename, error = %e, "download failed"),
            }
            error_response(&e)
        }
    }
}

async fn handle_download(
    state: &AppState,
    filename: &str,
    params: DownloadParams,
) -> Result<Response, GatewayError> {
    if filename.contains('/') || filename.contains('\\') {
        return Err(GatewayError::BadRequest(
            "filename must not contain path separators".into(),
        ));
    }

    let decrypt = match (params.key, params.iv) {
        (Some(key_hex), Some(iv_hex)) => {
            Some(parse_hex(&key_hex, &iv_hex).map_err(|e| GatewayError::BadRequest(e.to_string()))?)
        }
        (None, None) => None,
        _ => {
            return Err(GatewayError::BadRequest(
                "key and iv must be supplied together".into(),
            ))
        }
    };

    let object = state.store.get(filename).await?;

    let (attachment_name, body) = match decrypt {
        None => (
            filename.to_owned(),
            Body::from_stream(ReaderStream::new(object.into_async_read())),
        ),
        Some((key, iv)) => {
            let name = filename
                .strip_suffix(ENCRYPTED_SUFFIX)
                .unwrap_or(filename)
                .to_owned();
            (name, decrypting_body(object, key, iv))
        }
    };

    let safe_name = attachment_name.replace(['"', '\r', '\n'], "_");
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{safe_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Build a response body that decrypts the object stream on the fly.
///
/// Chunks pass through the engine in arrival order, so the positional CTR
/// keystream lines up regardless of how the store slices the stream. A
/// mid-stream fault surfaces as a stream error, which aborts the connection
/// instead of delivering a silently truncated body.
fn decrypting_body(object: ByteStream, key: CipherKey, iv: Iv) -> Body {
    let mut engine = CipherEngine::new(&key, &iv);
    let stream = ReaderStream::new(object.into_async_read()).map(move |chunk| {
        chunk.and_then(|data| {
            let mut buf = data.to_vec();
            engine
                .apply(&mut buf)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            Ok(Bytes::from(buf))
        })
    });
    Body::from_stream(stream)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// `GET /health` — liveness probe, unauthenticated.
pub async fn health(State(state): State<AppState>) -> Response {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    let body = HealthResponse {
        status: "ok".into(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        timestamp_ms,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}
