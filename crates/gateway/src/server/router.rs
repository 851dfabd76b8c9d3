//! Route table and middleware stack assembly.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the gateway router.
///
/// `/upload` and `/download` sit behind bearer-token auth; `/health` and the
/// 404 fallback do not. The body limit comes from configuration so large
/// uploads can be allowed per deployment.
pub fn build(state: AppState) -> Router {
    let auth = axum::middleware::from_fn_with_state(state.clone(), middleware::require_bearer);

    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/download/:filename", get(handlers::download))
        .route_layer(auth)
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}
