//! Shared application state injected into every Axum handler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::store::ObjectStore;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or `Copy`) so that Axum can
/// clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Object store the ciphertext artifacts live in.
    pub store: Arc<dyn ObjectStore>,
    /// Shared bearer secret callers must present.
    pub auth_token: Arc<String>,
    /// Directory transient staging files are written to.
    pub upload_dir: Arc<PathBuf>,
    /// Maximum accepted upload body size in bytes.
    pub max_upload_bytes: usize,
    /// Process start time, backing the health endpoint's uptime field.
    pub started_at: Instant,
}

impl AppState {
    /// Create a new [`AppState`] with the provided store and settings.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        auth_token: String,
        upload_dir: PathBuf,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            auth_token: Arc::new(auth_token),
            upload_dir: Arc::new(upload_dir),
            max_upload_bytes,
            started_at: Instant::now(),
        }
    }
}
